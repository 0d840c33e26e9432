mod notification_repo;

pub use notification_repo::NotificationRepo;
