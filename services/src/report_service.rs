//! Aggregates over verified achievements.
//!
//! The reference table decides which ids count (status = verified); the
//! document store supplies the numbers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use db::documents::{AchievementDocument, AchievementDocumentStore, AchievementType};
use db::models::student;
use db::repositories::AchievementReferenceRepository;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AchievementStatistics {
    pub total_verified_achievements: u64,
    pub total_points: i64,
    pub average_points: f64,
    pub achievement_by_type: BTreeMap<AchievementType, u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StudentReport {
    pub student_id: String,
    pub total_verified: u64,
    pub total_points: i64,
    pub average_points: f64,
    pub points_by_type: BTreeMap<AchievementType, i64>,
    pub average_points_by_type: BTreeMap<AchievementType, f64>,
    pub achievements: Vec<AchievementDocument>,
}

pub struct ReportService {
    db: DatabaseConnection,
    references: AchievementReferenceRepository,
    documents: Arc<dyn AchievementDocumentStore>,
}

impl ReportService {
    pub fn new(db: DatabaseConnection, documents: Arc<dyn AchievementDocumentStore>) -> Self {
        let references = AchievementReferenceRepository::new(db.clone());
        Self {
            db,
            references,
            documents,
        }
    }

    /// System-wide totals. The count is the number of verified documents the
    /// store still holds, so a reference whose document is gone does not drag
    /// the average down.
    pub async fn statistics(&self) -> ServiceResult<AchievementStatistics> {
        let ids = self.references.verified_document_ids().await?;
        if ids.is_empty() {
            return Ok(AchievementStatistics {
                total_verified_achievements: 0,
                total_points: 0,
                average_points: 0.0,
                achievement_by_type: BTreeMap::new(),
            });
        }

        let total_points = self.documents.sum_points(&ids).await?;
        let achievement_by_type: BTreeMap<_, _> = self.documents.count_by_type(&ids).await?.into_iter().collect();
        let count: u64 = achievement_by_type.values().sum();

        Ok(AchievementStatistics {
            total_verified_achievements: count,
            total_points,
            average_points: mean(total_points, count),
            achievement_by_type,
        })
    }

    pub async fn student_report(&self, student_id: &str) -> ServiceResult<StudentReport> {
        student::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))?;

        let ids = self.references.verified_document_ids_for_student(student_id).await?;
        let mut by_id: HashMap<String, AchievementDocument> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.documents
                .find_by_ids(&ids)
                .await?
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect()
        };
        // Keep verification order.
        let achievements: Vec<AchievementDocument> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

        let mut points_by_type: BTreeMap<AchievementType, i64> = BTreeMap::new();
        let mut counts: BTreeMap<AchievementType, u64> = BTreeMap::new();
        for doc in &achievements {
            *points_by_type.entry(doc.achievement_type).or_default() += i64::from(doc.points);
            *counts.entry(doc.achievement_type).or_default() += 1;
        }

        let average_points_by_type = points_by_type
            .iter()
            .map(|(kind, total)| (*kind, mean(*total, counts.get(kind).copied().unwrap_or(0))))
            .collect();

        let total_points: i64 = points_by_type.values().sum();
        let total_verified = achievements.len() as u64;

        Ok(StudentReport {
            student_id: student_id.to_string(),
            total_verified,
            total_points,
            average_points: mean(total_points, total_verified),
            points_by_type,
            average_points_by_type,
            achievements,
        })
    }
}

fn mean(total: i64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievement_service::tests::{content, fixture};
    use crate::achievement_service::AchievementView;

    async fn verified(
        f: &crate::achievement_service::tests::Fixture,
        caller: &crate::Caller,
        title: &str,
        kind: AchievementType,
        points: i32,
    ) -> AchievementView {
        let view = f.service.create(caller, content(title, kind)).await.unwrap();
        f.service.submit(caller, &view.id).await.unwrap();
        f.service.verify(&f.advisor, &view.id, points).await.unwrap()
    }

    #[tokio::test]
    async fn statistics_are_zero_without_verified_achievements() {
        let f = fixture().await;
        let view = f.service.create(&f.alice, content("pending", AchievementType::Event)).await.unwrap();
        f.service.submit(&f.alice, &view.id).await.unwrap();

        let reports = ReportService::new(f.db.clone(), f.store.clone());
        let stats = reports.statistics().await.unwrap();
        assert_eq!(stats.total_verified_achievements, 0);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.average_points, 0.0);
        assert!(stats.achievement_by_type.is_empty());
    }

    #[tokio::test]
    async fn statistics_cover_only_verified_ids() {
        let f = fixture().await;
        verified(&f, &f.alice, "a", AchievementType::Competition, 50).await;
        verified(&f, &f.bob, "b", AchievementType::Publication, 25).await;

        let rejected = f.service.create(&f.bob, content("c", AchievementType::Competition)).await.unwrap();
        f.service.submit(&f.bob, &rejected.id).await.unwrap();
        f.service.reject(&f.advisor, &rejected.id, "no proof").await.unwrap();
        f.service.create(&f.alice, content("draft", AchievementType::Competition)).await.unwrap();

        let reports = ReportService::new(f.db.clone(), f.store.clone());
        let stats = reports.statistics().await.unwrap();
        assert_eq!(stats.total_verified_achievements, 2);
        assert_eq!(stats.total_points, 75);
        assert_eq!(stats.average_points, 37.5);
        assert_eq!(stats.achievement_by_type.get(&AchievementType::Competition), Some(&1));
        assert_eq!(stats.achievement_by_type.get(&AchievementType::Publication), Some(&1));
    }

    #[tokio::test]
    async fn student_report_after_full_workflow() {
        let f = fixture().await;
        let view = f.service.create(&f.alice, content("Regional final", AchievementType::Competition)).await.unwrap();
        assert_eq!(view.points, 0);
        f.service.submit(&f.alice, &view.id).await.unwrap();
        f.service.verify(&f.advisor, &view.id, 50).await.unwrap();

        let reports = ReportService::new(f.db.clone(), f.store.clone());
        let report = reports.student_report(&f.alice_student_id).await.unwrap();

        assert_eq!(report.total_verified, 1);
        assert_eq!(report.total_points, 50);
        assert_eq!(report.average_points, 50.0);
        assert_eq!(report.points_by_type.get(&AchievementType::Competition), Some(&50));
        assert_eq!(report.average_points_by_type.get(&AchievementType::Competition), Some(&50.0));
        assert_eq!(report.achievements.len(), 1);
        assert_eq!(report.achievements[0].id, view.id);
    }

    #[tokio::test]
    async fn student_report_groups_by_type_with_other_bucket() {
        let f = fixture().await;
        verified(&f, &f.alice, "x", AchievementType::Event, 10).await;
        verified(&f, &f.alice, "y", AchievementType::Event, 30).await;
        verified(&f, &f.alice, "z", AchievementType::from_label("hackathon"), 5).await;
        verified(&f, &f.bob, "not alice", AchievementType::Event, 100).await;

        let reports = ReportService::new(f.db.clone(), f.store.clone());
        let report = reports.student_report(&f.alice_student_id).await.unwrap();

        assert_eq!(report.total_verified, 3);
        assert_eq!(report.total_points, 45);
        assert_eq!(report.average_points, 15.0);
        assert_eq!(report.points_by_type.get(&AchievementType::Event), Some(&40));
        assert_eq!(report.average_points_by_type.get(&AchievementType::Event), Some(&20.0));
        assert_eq!(report.points_by_type.get(&AchievementType::Other), Some(&5));
    }

    #[tokio::test]
    async fn student_report_for_student_without_verified_items() {
        let f = fixture().await;
        let reports = ReportService::new(f.db.clone(), f.store.clone());
        let report = reports.student_report(&f.alice_student_id).await.unwrap();
        assert_eq!(report.total_verified, 0);
        assert_eq!(report.average_points, 0.0);
        assert!(report.achievements.is_empty());
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let f = fixture().await;
        let reports = ReportService::new(f.db.clone(), f.store.clone());
        assert_eq!(
            reports.student_report("missing").await.unwrap_err(),
            ServiceError::not_found("Student")
        );
    }
}
