use async_trait::async_trait;
use db::models::{lecturer, student, user};
use db::rbac::{self, RoleName};
use fake::{
    Fake,
    faker::name::en::{FirstName, LastName},
};
use sea_orm::{DatabaseConnection, DbErr};

use crate::seed::Seeder;

const PASSWORD: &str = "password123";
const LECTURERS: usize = 2;
const STUDENTS: usize = 6;
const PROGRAMS: [&str; 3] = ["Informatics", "Information Systems", "Data Science"];
const DEPARTMENTS: [&str; 2] = ["Computer Science", "Information Systems"];

/// Demo accounts, all with password `password123`:
/// - `admin`
/// - `lecturer1`, `lecturer2`
/// - `student1`..`student6`, advisors assigned round robin
///
/// Accounts that already exist are left alone, so the seeder can be rerun.
pub struct UserSeeder;

#[async_trait]
impl Seeder for UserSeeder {
    async fn seed(&self, db: &DatabaseConnection) -> Result<(), DbErr> {
        ensure_user(db, "admin", "System Administrator", RoleName::Admin).await?;

        let mut advisors = Vec::with_capacity(LECTURERS);
        for n in 1..=LECTURERS {
            let account = ensure_user(db, &format!("lecturer{n}"), &random_name(), RoleName::Lecturer).await?;
            let profile = match lecturer::Model::find_by_user_id(db, &account.id).await? {
                Some(existing) => existing,
                None => {
                    let department = DEPARTMENTS[(n - 1) % DEPARTMENTS.len()];
                    lecturer::Model::create(db, &account.id, &format!("L-{n:04}"), department).await?
                }
            };
            advisors.push(profile.id);
        }

        for n in 1..=STUDENTS {
            let account = ensure_user(db, &format!("student{n}"), &random_name(), RoleName::Student).await?;
            if student::Model::find_by_user_id(db, &account.id).await?.is_some() {
                continue;
            }
            let advisor = advisors.get((n - 1) % advisors.len().max(1)).map(String::as_str);
            let program = PROGRAMS[fastrand::usize(..PROGRAMS.len())];
            let year = format!("{}", 2022 + fastrand::u32(0..4));
            student::Model::create(db, &account.id, &format!("S-{n:04}"), program, &year, advisor).await?;
        }

        Ok(())
    }
}

async fn ensure_user(
    db: &DatabaseConnection,
    username: &str,
    full_name: &str,
    role: RoleName,
) -> Result<user::Model, DbErr> {
    if let Some(existing) = user::Model::find_by_login(db, username).await? {
        return Ok(existing);
    }

    let role = rbac::find_role(db, role)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("role {role} is not seeded")))?;

    user::Model::create(db, username, &format!("{username}@example.com"), PASSWORD, full_name, &role.id).await
}

fn random_name() -> String {
    let first: String = FirstName().fake();
    let last: String = LastName().fake();
    format!("{first} {last}")
}
