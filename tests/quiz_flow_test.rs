mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;

use common::{build_app, database_pool, get_request, json_request, send, test_config, ScriptedModel};

const FENCED_QUIZ: &str = "Here you go:\n```json\n[\n  {\"question\": \"What does `let` declare?\", \"options\": [\"A binding\", \"A loop\", \"A module\", \"A macro\"], \"correctAnswer\": \"A binding\", \"explanation\": \"let introduces a variable binding.\"},\n  {\"question\": \"Which keyword makes a binding mutable?\", \"options\": [\"mut\", \"var\", \"ref\", \"dyn\"], \"correctAnswer\": \"mut\"}\n]\n```";

fn unique_user() -> (String, String) {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    (format!("user_{}", &tag[..12]), format!("{}@example.com", &tag[..12]))
}

async fn register(app: &axum::Router) -> (String, i64, String) {
    let (username, email) = unique_user();
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "username": username, "email": email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["username"], username.as_str());
    let token = body["token"].as_str().unwrap().to_string();
    let id = body["data"]["id"].as_i64().unwrap();
    (token, id, email)
}

async fn correct_option(pool: &PgPool, question_id: i64) -> i32 {
    sqlx::query_scalar("SELECT id FROM options WHERE question_id = $1 AND is_correct")
        .bind(question_id as i32)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn wrong_option(pool: &PgPool, question_id: i64) -> i32 {
    sqlx::query_scalar(
        "SELECT id FROM options WHERE question_id = $1 AND NOT is_correct ORDER BY position LIMIT 1",
    )
    .bind(question_id as i32)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn multiple_choice_quiz_end_to_end() {
    let Some(pool) = database_pool().await else {
        return;
    };
    let url = std::env::var("DATABASE_URL").unwrap();
    let app = build_app(pool.clone(), test_config(&url), ScriptedModel::new([FENCED_QUIZ]));
    let (token, _, email) = register(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/login", None, &json!({ "email": email, "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/quizzes/generate",
            Some(&token),
            &json!({ "topic": "Rust basics", "difficulty": "easy", "numQuestions": 3 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let data = &body["data"];
    assert_eq!(data["numQuestions"], 2);
    assert_eq!(data["difficulty"], "easy");
    assert_eq!(data["questionType"], "MultipleChoice");
    assert_eq!(data["source"], "topic");
    let quiz_id = data["quizId"].as_i64().unwrap();

    let (status, body) = send(&app, get_request(&format!("/api/quizzes/{}", quiz_id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["data"]["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["question"], "What does `let` declare?");
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);
    assert!(!body.to_string().contains("isCorrect"));
    assert!(!body.to_string().contains("correctAnswer"));

    let q1 = questions[0]["id"].as_i64().unwrap();
    let q2 = questions[1]["id"].as_i64().unwrap();
    let answers = json!({
        "answers": [
            { "questionId": q1, "selectedOptionId": correct_option(&pool, q1).await },
            { "questionId": q2, "selectedOptionId": wrong_option(&pool, q2).await }
        ],
        "timeSpent": 42
    });
    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/quizzes/{}/submit", quiz_id), Some(&token), &answers),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["score"], 1);
    assert_eq!(body["data"]["totalQuestions"], 2);
    assert_eq!(body["data"]["percentage"], 50.0);
    assert!(body["data"].get("grading").is_none());

    let (status, body) = send(
        &app,
        get_request(&format!("/api/quizzes/{}/results", quiz_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let analysis = &body["data"]["analysis"];
    assert_eq!(analysis["strength"], "More practice recommended");
    assert_eq!(analysis["feedback"], "Keep practicing to improve");
    assert_eq!(analysis["timeTaken"], 42);
    let result_questions = body["data"]["questions"].as_array().unwrap();
    assert_eq!(result_questions[0]["correct"], true);
    assert_eq!(result_questions[1]["correct"], false);
    assert_eq!(result_questions[1]["explanation"], "No explanation provided.");

    let (status, body) = send(&app, get_request("/api/quizzes/history", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["topic"], "Rust basics");

    let (status, body) = send(&app, get_request("/api/quizzes/user/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalQuizzes"], 1);
    assert_eq!(body["data"]["completedQuizzes"], 1);
    assert_eq!(body["data"]["averageScore"], 50.0);
    assert_eq!(body["data"]["quizSources"][0]["source_type"], "topic");

    let (status, body) = send(&app, get_request("/api/users/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["topTopics"][0]["count"], 1);
}

#[tokio::test]
async fn unusable_model_reply_still_creates_quiz() {
    let Some(pool) = database_pool().await else {
        return;
    };
    let url = std::env::var("DATABASE_URL").unwrap();
    let app = build_app(pool, test_config(&url), ScriptedModel::new(["I cannot answer that."]));
    let (token, _, _) = register(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/quizzes/generate",
            Some(&token),
            &json!({ "topic": "JavaScript closures", "numQuestions": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["numQuestions"], 3);
    let quiz_id = body["data"]["quizId"].as_i64().unwrap();

    let (_, body) = send(&app, get_request(&format!("/api/quizzes/{}", quiz_id), Some(&token))).await;
    assert_eq!(
        body["data"]["questions"][0]["question"],
        "What is JavaScript primarily used for?"
    );
}

#[tokio::test]
async fn subjective_answers_are_graded_by_the_model() {
    let Some(pool) = database_pool().await else {
        return;
    };
    let url = std::env::var("DATABASE_URL").unwrap();
    let app = build_app(
        pool,
        test_config(&url),
        ScriptedModel::new([
            r#"[{"question": "What is the capital of France?", "explanation": "Paris"}]"#,
            r#"{"score": 80, "reason": "Correct, student."}"#,
        ]),
    );
    let (token, _, _) = register(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/quizzes/generate",
            Some(&token),
            &json!({ "topic": "Geography", "numQuestions": 1, "questionType": "Subjective" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let quiz_id = body["data"]["quizId"].as_i64().unwrap();

    let (_, body) = send(&app, get_request(&format!("/api/quizzes/{}", quiz_id), Some(&token))).await;
    let question_id = body["data"]["questions"][0]["id"].as_i64().unwrap();
    assert!(body["data"]["questions"][0]["options"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/quizzes/{}/submit", quiz_id),
            Some(&token),
            &json!({ "answers": [{ "questionId": question_id, "answer": "It is Paris" }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["score"], 80);
    assert_eq!(body["data"]["percentage"], 80.0);
    assert_eq!(body["data"]["grading"][0]["reason"], "Correct, student.");

    let (_, body) = send(
        &app,
        get_request(&format!("/api/quizzes/{}/results", quiz_id), Some(&token)),
    )
    .await;
    let question = &body["data"]["questions"][0];
    assert_eq!(question["subjectiveAnswer"], "It is Paris");
    assert_eq!(question["subjectiveScore"], 80.0);
    assert_eq!(question["correct"], true);
    assert_eq!(body["data"]["analysis"]["strength"], "Excellent understanding of the topic!");
}

#[tokio::test]
async fn accounts_and_ownership_are_enforced() {
    let Some(pool) = database_pool().await else {
        return;
    };
    let url = std::env::var("DATABASE_URL").unwrap();
    let app = build_app(pool, test_config(&url), ScriptedModel::new([FENCED_QUIZ]));
    let (owner_token, _, owner_email) = register(&app).await;
    let (other_token, _, _) = register(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "username": "someone_new", "email": owner_email, "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": owner_email, "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (_, body) = send(
        &app,
        json_request("POST", "/api/quizzes/generate", Some(&owner_token), &json!({ "topic": "Rust" })),
    )
    .await;
    let quiz_id = body["data"]["quizId"].as_i64().unwrap();

    let (status, body) = send(&app, get_request(&format!("/api/quizzes/{}", quiz_id), Some(&other_token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Quiz not found or unauthorized");

    let (status, _) = send(
        &app,
        get_request(&format!("/api/quizzes/{}/results", quiz_id), Some(&owner_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (new_name, new_email) = unique_user();
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/users/profile",
            Some(&owner_token),
            &json!({ "username": new_name, "email": new_email }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], new_email.as_str());

    let (_, body) = send(&app, get_request("/api/users/profile", Some(&owner_token))).await;
    assert_eq!(body["data"]["username"], new_name.as_str());
}

fn multipart_request(token: &str, fields: &[(&str, &str)], file: Option<&[u8]>) -> Request<Body> {
    let boundary = "quizverse-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"{n}\"\r\n\r\n{v}\r\n",
                b = boundary,
                n = name,
                v = value
            )
            .as_bytes(),
        );
    }
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"notes.pdf\"\r\nContent-Type: application/pdf\r\n\r\n",
                b = boundary
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/quizzes/generate-from-pdf")
        .header("authorization", format!("Bearer {}", token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn pdf_upload_is_checked_before_generation() {
    let Some(pool) = database_pool().await else {
        return;
    };
    let url = std::env::var("DATABASE_URL").unwrap();
    let app = build_app(pool, test_config(&url), ScriptedModel::new(Vec::<String>::new()));
    let (token, _, _) = register(&app).await;

    let (status, body) = send(
        &app,
        multipart_request(&token, &[("topic", "Cells"), ("questionType", "MultipleChoice")], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "PDF file is required");

    let (status, body) = send(
        &app,
        multipart_request(&token, &[("topic", "Cells")], Some(&b"%PDF-1.4 fake"[..])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Question Type is required");

    let (status, body): (StatusCode, JsonValue) = send(
        &app,
        multipart_request(
            &token,
            &[("topic", "Cells"), ("questionType", "MultipleChoice")],
            Some(&b"PK\x03\x04 zip archive"[..]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error generating quiz from PDF");
    assert_eq!(body["error"], "Only PDF files are allowed");
    assert!(body["suggestion"].is_string());
}
