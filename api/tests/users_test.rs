mod helpers;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use db::rbac::{RoleName, find_role};
    use serde_json::{Value, json};

    use crate::helpers::{TestApp, make_test_app};

    async fn role_id(app: &TestApp, role: RoleName) -> String {
        find_role(app.state.db(), role).await.unwrap().unwrap().id
    }

    fn new_user(username: &str, role_id: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{username}@uni.test"),
            "password": "password123",
            "full_name": format!("{username} full"),
            "role_id": role_id,
        })
    }

    #[tokio::test]
    async fn list_and_get_users_as_admin() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;

        let (status, body) = app.get("/api/v1/users?limit=2", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 5);
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

        let (status, body) = app.get(&format!("/api/v1/users/{}", app.alice.0.id), &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "alice");
        assert_eq!(body["data"]["role"], "student");

        let (status, _) = app.get("/api/v1/users/nobody", &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_admins_cannot_manage_users() {
        let app = make_test_app().await;
        let advisor = app.login("advisor").await;
        let (status, body) = app.get("/api/v1/users", &advisor).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Missing required permission: user:manage");
    }

    #[tokio::test]
    async fn create_student_with_profile_and_advisor() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let student_role = role_id(&app, RoleName::Student).await;

        let mut body = new_user("dina", &student_role);
        body["student"] = json!({
            "student_number": "S-0042",
            "program_study": "Informatics",
            "academic_year": "2025",
            "advisor_id": app.advisor.1.id,
        });

        let (status, created) = app.post("/api/v1/users", &admin, &body).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        assert_eq!(created["data"]["role"], "student");

        let dina = app.login("dina").await;
        let (_, profile) = app.get("/api/v1/auth/profile", &dina).await;
        assert_eq!(profile["data"]["student"]["student_number"], "S-0042");
        assert_eq!(profile["data"]["student"]["advisor_id"], app.advisor.1.id.as_str());
    }

    #[tokio::test]
    async fn create_rejects_duplicates_unknown_roles_and_short_passwords() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let student_role = role_id(&app, RoleName::Student).await;

        let (status, body) = app.post("/api/v1/users", &admin, &new_user("alice", &student_role)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username or email is already in use");

        let mut padded = new_user("alice", &student_role);
        padded["username"] = json!(" alice");
        padded["email"] = json!("fresh@uni.test");
        let (status, body) = app.post("/api/v1/users", &admin, &padded).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username or email is already in use");

        let (status, body) = app.post("/api/v1/users", &admin, &new_user("erin", "no-such-role")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "role_id does not match any role");

        let mut short = new_user("frank", &student_role);
        short["password"] = json!("short");
        let (status, body) = app.post("/api/v1/users", &admin, &short).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "password must be at least 8 characters");
    }

    #[tokio::test]
    async fn update_needs_at_least_one_field() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let uri = format!("/api/v1/users/{}", app.bob.0.id);

        let (status, body) = app.put(&uri, &admin, &json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least one field must be provided");

        let (status, body) = app.put(&uri, &admin, &json!({ "full_name": "Bob Builder" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["full_name"], "Bob Builder");
    }

    #[tokio::test]
    async fn deactivated_users_cannot_log_in() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;

        let (status, _) = app
            .put(&format!("/api/v1/users/{}", app.bob.0.id), &admin, &json!({ "is_active": false }))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .send(crate::helpers::app::json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                &json!({ "username": "bob", "password": crate::helpers::app::PASSWORD }),
            ))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Account is inactive");
    }

    #[tokio::test]
    async fn assign_role_changes_permissions_on_next_login() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let lecturer_role = role_id(&app, RoleName::Lecturer).await;

        let (status, body) = app
            .put(
                &format!("/api/v1/users/{}/role", app.bob.0.id),
                &admin,
                &json!({ "role_id": lecturer_role }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "lecturer");

        let bob = app.login("bob").await;
        let (status, _) = app.get("/api/v1/reports/statistics", &bob).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = app
            .put(&format!("/api/v1/users/{}/role", app.bob.0.id), &admin, &json!({ "role_id": "nope" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_is_blocked_while_the_student_has_achievements() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;
        let alice = app.login("alice").await;
        app.create_achievement(&alice, "Keeps me alive", "event").await;

        let (status, _) = app.delete(&format!("/api/v1/users/{}", app.alice.0.id), &admin).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.delete(&format!("/api/v1/users/{}", app.bob.0.id), &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User deleted successfully");

        let (status, _) = app.get(&format!("/api/v1/users/{}", app.bob.0.id), &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_a_lecturer_detaches_advisees() {
        let app = make_test_app().await;
        let admin = app.login("admin").await;

        let (status, _) = app.delete(&format!("/api/v1/users/{}", app.advisor.0.id), &admin).await;
        assert_eq!(status, StatusCode::OK);

        let (_, student) = app.get(&format!("/api/v1/students/{}", app.alice.1.id), &admin).await;
        assert_eq!(student["data"]["advisor_id"], Value::Null);
    }
}
