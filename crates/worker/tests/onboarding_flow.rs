//! End-to-end: a published `UserCreated` ends with one welcome email sent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeZone;
use roster_core::user::UserRecord;
use roster_events::{ChannelQueue, EventBus, UserCreated, WelcomeEmailJob, WelcomeEmailRelay};
use roster_worker::{JobRunner, MailError, Mailer, WorkerConfig};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<WelcomeEmailJob>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_welcome(&self, job: &WelcomeEmailJob) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(job.clone());
        Ok(())
    }
}

fn user(id: i64, name: &str, email: &str) -> UserRecord {
    UserRecord {
        id,
        name: name.to_string(),
        email: email.to_string(),
        created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn each_created_user_gets_exactly_one_welcome_email() {
    let (queue, receiver) = ChannelQueue::new();
    let mut bus = EventBus::new();
    WelcomeEmailRelay::new(Arc::new(queue)).register(&mut bus);

    bus.publish(&UserCreated {
        user: user(1, "Ada", "ada@example.com"),
    })
    .unwrap();
    bus.publish(&UserCreated {
        user: user(2, "Bob", "a@b.com"),
    })
    .unwrap();
    drop(bus);

    let mailer = Arc::new(RecordingMailer::default());
    let runner = JobRunner::new(
        mailer.clone(),
        WorkerConfig {
            max_attempts: 3,
            backoff: vec![Duration::ZERO],
        },
    );

    tokio::time::timeout(
        Duration::from_secs(5),
        runner.run(receiver, CancellationToken::new()),
    )
    .await
    .expect("runner should drain and stop once the bus is gone");

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(
        *sent,
        vec![
            WelcomeEmailJob {
                recipient_email: "ada@example.com".to_string(),
                recipient_name: "Ada".to_string(),
            },
            WelcomeEmailJob {
                recipient_email: "a@b.com".to_string(),
                recipient_name: "Bob".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn invalid_user_is_rejected_before_anything_is_queued() {
    let (queue, mut receiver) = ChannelQueue::new();
    let mut bus = EventBus::new();
    WelcomeEmailRelay::new(Arc::new(queue)).register(&mut bus);

    let result = bus.publish(&UserCreated {
        user: user(3, "", "c@d.com"),
    });

    assert!(result.is_err());
    assert!(receiver.try_recv().is_err());
}
