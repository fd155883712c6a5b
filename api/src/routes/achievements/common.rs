use db::documents::{AchievementContent, AchievementDetails, AchievementType};
use serde::Deserialize;
use validator::Validate;

/// Body of create and update. Unknown `achievement_type` labels become `other`.
#[derive(Debug, Deserialize, Validate)]
pub struct AchievementRequest {
    #[serde(default)]
    pub achievement_type: AchievementType,
    #[validate(length(min = 1, max = 200, message = "title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: String,
    #[serde(default)]
    pub details: AchievementDetails,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<AchievementRequest> for AchievementContent {
    fn from(req: AchievementRequest) -> Self {
        AchievementContent {
            achievement_type: req.achievement_type,
            title: req.title,
            description: req.description,
            details: req.details,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(range(min = 1, message = "points must be greater than 0"))]
    pub points: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1, message = "rejection_note is required"))]
    pub rejection_note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_and_missing_fields_fall_back() {
        let req: AchievementRequest =
            serde_json::from_value(serde_json::json!({ "title": "Hackathon", "achievement_type": "hackathon" })).unwrap();
        assert!(req.validate().is_ok());

        let content = AchievementContent::from(req);
        assert_eq!(content.achievement_type, AchievementType::Other);
        assert!(content.tags.is_empty());
    }

    #[test]
    fn verify_requires_positive_points() {
        assert!(VerifyRequest { points: 0 }.validate().is_err());
        assert!(VerifyRequest { points: 5 }.validate().is_ok());
    }
}
