mod helpers;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::helpers::make_test_app;

    #[tokio::test]
    async fn students_are_listed_by_number_with_user_details() {
        let app = make_test_app().await;
        let advisor = app.login("advisor").await;

        let (status, body) = app.get("/api/v1/students", &advisor).await;

        assert_eq!(status, StatusCode::OK);
        let items = body["data"]["items"].as_array().unwrap();
        let numbers: Vec<&str> = items.iter().map(|s| s["student_number"].as_str().unwrap()).collect();
        assert_eq!(numbers, ["S-alice", "S-bob"]);
        assert_eq!(items[0]["username"], "alice");
        assert_eq!(items[0]["advisor_id"], app.advisor.1.id.as_str());
    }

    #[tokio::test]
    async fn students_cannot_browse_the_directory() {
        let app = make_test_app().await;
        let alice = app.login("alice").await;
        let (status, _) = app.get("/api/v1/students", &alice).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.get("/api/v1/lecturers", &alice).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn get_student_and_their_achievements() {
        let app = make_test_app().await;
        let alice = app.login("alice").await;
        let advisor = app.login("advisor").await;
        app.create_achievement(&alice, "Draft one", "event").await;
        app.create_achievement(&alice, "Draft two", "other").await;

        let (status, body) = app.get(&format!("/api/v1/students/{}", app.alice.1.id), &advisor).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["full_name"], "alice test");

        let (status, body) = app
            .get(&format!("/api/v1/students/{}/achievements", app.alice.1.id), &advisor)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, body) = app.get("/api/v1/students/missing/achievements", &advisor).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Student not found");
    }

    #[tokio::test]
    async fn admin_reassigns_and_clears_advisor() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let uri = format!("/api/v1/students/{}/advisor", app.bob.1.id);

        let (status, body) = app
            .put(&uri, &admin, &json!({ "advisor_id": app.other_lecturer.1.id }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["advisor_id"], app.other_lecturer.1.id.as_str());

        let (status, body) = app.put(&uri, &admin, &json!({ "advisor_id": null })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["advisor_id"], Value::Null);

        let (status, body) = app.put(&uri, &admin, &json!({ "advisor_id": "not-a-lecturer" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "advisor_id does not match any lecturer");

        let (status, _) = app
            .put("/api/v1/students/missing/advisor", &admin, &json!({ "advisor_id": null }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lecturers_cannot_reassign_advisors() {
        let app = make_test_app().await;
        let advisor = app.login("advisor").await;
        let (status, _) = app
            .put(
                &format!("/api/v1/students/{}/advisor", app.bob.1.id),
                &advisor,
                &json!({ "advisor_id": app.advisor.1.id }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn lecturers_see_only_their_own_advisees() {
        let app = make_test_app().await;
        let advisor = app.login("advisor").await;
        let other = app.login("other_lecturer").await;
        let admin = app.login("admin").await;
        let uri = format!("/api/v1/lecturers/{}/advisees", app.advisor.1.id);

        let (status, body) = app.get(&uri, &advisor).await;
        assert_eq!(status, StatusCode::OK);
        let advisees = body["data"].as_array().unwrap();
        assert_eq!(advisees.len(), 1);
        assert_eq!(advisees[0]["id"], app.alice.1.id.as_str());

        let (status, _) = app.get(&uri, &other).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.get(&uri, &admin).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app.get("/api/v1/lecturers/missing/advisees", &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lecturers_are_listed() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let (status, body) = app.get("/api/v1/lecturers", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 2);
    }
}
