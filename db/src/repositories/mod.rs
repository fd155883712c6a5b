pub mod achievement_reference_repository;

pub use achievement_reference_repository::AchievementReferenceRepository;
