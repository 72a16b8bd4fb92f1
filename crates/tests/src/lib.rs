//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试（JSON 结构）
//! - 端到端测试：配置 -> 名册 -> 分发 -> spool 邮件文件
//! - 失败隔离与取消行为

#[cfg(test)]
mod contract_tests {
    use contracts::{FailureReason, Outcome, Roster};

    #[test]
    fn test_outcome_json_shape() {
        let sent = serde_json::to_value(Outcome::Sent).unwrap();
        assert_eq!(sent, serde_json::json!({ "status": "sent" }));

        let failed =
            serde_json::to_value(Outcome::failed(FailureReason::Transport("timeout".into())))
                .unwrap();
        assert_eq!(
            failed,
            serde_json::json!({
                "status": "failed",
                "reason": { "kind": "transport", "detail": "timeout" }
            })
        );

        let cancelled = serde_json::to_value(Outcome::cancelled()).unwrap();
        assert_eq!(cancelled["reason"]["kind"], "cancelled");
    }

    #[test]
    fn test_roster_minimal_json() {
        let roster: Roster = serde_json::from_str(
            r#"{
                "courses": [{ "name": "AI", "instructor": "Dr. Nouri" }],
                "students": []
            }"#,
        )
        .unwrap();
        assert_eq!(roster.courses[0].id, 0);
        assert!(roster.students.is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::ConfigLoader;
    use contracts::{FailureReason, Notifier, NotifyError, Outcome, ResultNotice};
    use dispatcher::{
        create_mail_notifier, dispatch, CancellationToken, DispatchConfig, Dispatcher,
        DispatcherBuilder,
    };
    use observability::DispatchStatsAggregator;
    use registry::{announce_course_results, RecordStore};

    const STUDENTS: [(&str, &str, &str, i32); 7] = [
        ("Ali", "Rezaei", "ali@uni.example", 17),
        ("Sara", "Karimi", "sara@uni.example", 19),
        ("Reza", "Hosseini", "reza@uni.example", 11),
        ("Mina", "Ahmadi", "mina@uni.example", 15),
        ("Omid", "Moradi", "omid@uni.example", 8),
        ("Neda", "Sadeghi", "neda@uni.example", 20),
        ("Kian", "Ebrahimi", "kian@uni.example", 13),
    ];

    fn write_roster(dir: &Path) -> std::path::PathBuf {
        let students: Vec<_> = STUDENTS
            .iter()
            .map(|(first, last, email, score)| {
                serde_json::json!({
                    "first_name": first,
                    "last_name": last,
                    "email": email,
                    "score": score,
                    "course_id": 12,
                })
            })
            .collect();

        let roster = serde_json::json!({
            "courses": [
                { "id": 11, "name": "Operating Systems", "instructor": "Dr. Jafari" },
                { "id": 12, "name": "Networks", "instructor": "Dr. Amiri" },
            ],
            "students": students,
        });

        let path = dir.join("roster.json");
        std::fs::write(&path, serde_json::to_string_pretty(&roster).unwrap()).unwrap();
        path
    }

    fn networks_id(store: &RecordStore) -> u64 {
        store
            .courses()
            .into_iter()
            .find(|c| c.name == "Networks")
            .unwrap()
            .id
    }

    /// End-to-end: config file -> roster file -> spool transport
    ///
    /// 验证完整流程：
    /// 1. ConfigLoader 读取 TOML 配置
    /// 2. RecordStore 从 JSON 名册加载
    /// 3. 每个学生一封 .eml 文件，结果按学生顺序返回
    #[tokio::test]
    async fn test_e2e_announce_to_spool() {
        let dir = tempfile::tempdir().unwrap();
        let spool_dir = dir.path().join("outbox");
        let config_path = dir.path().join("course-notify.toml");
        std::fs::write(
            &config_path,
            format!(
                "[dispatch]\nmax_batch_size = 3\nmax_concurrent_workers = 2\n\n\
                 [mailer]\nsender = \"grades@uni.example\"\ntransport = \"spool\"\n\
                 spool_dir = {:?}\n",
                spool_dir.display().to_string()
            ),
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        let store = RecordStore::from_roster_path(&write_roster(dir.path())).unwrap();
        let course_id = networks_id(&store);

        let dispatcher = Dispatcher::new(DispatchConfig::from(&config.dispatch)).unwrap();
        let notifier = Arc::new(create_mail_notifier(&config.mailer).unwrap());

        let announcement = announce_course_results(
            &store,
            course_id,
            &dispatcher,
            notifier,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(announcement.summary.all_sent());
        assert_eq!(announcement.summary.total, 7);
        assert_eq!(announcement.summary.workers, 3);

        let emails: Vec<_> = announcement
            .results
            .iter()
            .map(|e| e.email.as_str())
            .collect();
        let expected: Vec<_> = STUDENTS.iter().map(|s| s.2).collect();
        assert_eq!(emails, expected);

        let spooled: Vec<String> = std::fs::read_dir(&spool_dir)
            .unwrap()
            .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap())
            .collect();
        assert_eq!(spooled.len(), 7);
        assert!(spooled
            .iter()
            .any(|m| m.contains("To: neda@uni.example") && m.contains("scored 20")));
        assert!(spooled
            .iter()
            .all(|m| m.contains("Subject: Results from: Networks Course by Dr. Amiri")));

        let mut stats = DispatchStatsAggregator::new();
        stats.update(
            &announcement.summary,
            announcement.elapsed.as_secs_f64() * 1000.0,
        );
        assert_eq!(stats.success_rate(), 100.0);
    }

    /// Fails for the listed recipient emails
    struct SelectiveNotifier {
        failing: Vec<&'static str>,
        attempts: AtomicUsize,
    }

    impl Notifier<ResultNotice> for SelectiveNotifier {
        fn name(&self) -> &str {
            "selective"
        }

        async fn send_one(&self, notice: &ResultNotice) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&notice.student.email.as_str()) {
                return Err(NotifyError::transport("550 mailbox unavailable"));
            }
            Ok(())
        }
    }

    /// Two failures in different batches leave every other student sent
    #[tokio::test]
    async fn test_e2e_failures_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::from_roster_path(&write_roster(dir.path())).unwrap();
        let course_id = networks_id(&store);

        let dispatcher = DispatcherBuilder::new().max_batch_size(3).build().unwrap();
        let notifier = Arc::new(SelectiveNotifier {
            failing: vec!["reza@uni.example", "neda@uni.example"],
            attempts: AtomicUsize::new(0),
        });

        let announcement = announce_course_results(
            &store,
            course_id,
            &dispatcher,
            Arc::clone(&notifier),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 7);
        assert_eq!(announcement.summary.sent, 5);
        assert_eq!(announcement.summary.failed, 2);

        for (i, entry) in announcement.results.iter().enumerate() {
            if i == 2 || i == 5 {
                assert!(matches!(
                    &entry.outcome,
                    Outcome::Failed {
                        reason: FailureReason::Transport(_)
                    }
                ));
            } else {
                assert_eq!(entry.outcome, Outcome::Sent, "student {i}");
            }
        }
    }

    /// Hangs for every recipient after the first of each batch
    struct StallingNotifier {
        delivered: Mutex<Vec<usize>>,
    }

    impl Notifier<usize> for StallingNotifier {
        fn name(&self) -> &str {
            "stalling"
        }

        async fn send_one(&self, recipient: &usize) -> Result<(), NotifyError> {
            if recipient % 4 != 0 {
                std::future::pending::<()>().await;
            }
            self.delivered.lock().unwrap().push(*recipient);
            Ok(())
        }
    }

    /// Cancelling mid-dispatch returns with the unfinished recipients cancelled
    #[tokio::test]
    async fn test_cancel_marks_unfinished() {
        let dispatcher = DispatcherBuilder::new().max_batch_size(4).build().unwrap();
        let notifier = Arc::new(StallingNotifier {
            delivered: Mutex::new(Vec::new()),
        });
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let recipients: Vec<usize> = (0..12).collect();
        let report = tokio::time::timeout(
            Duration::from_secs(5),
            dispatcher.send_with_cancel(recipients, Arc::clone(&notifier), &cancel),
        )
        .await
        .expect("cancelled dispatch must return")
        .unwrap();

        assert_eq!(report.outcomes.len(), 12);
        assert_eq!(report.summary.sent, 3);
        assert_eq!(report.summary.cancelled, 9);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(outcome.is_sent(), i % 4 == 0, "recipient {i}");
        }
    }

    struct AlwaysOk;

    impl Notifier<String> for AlwaysOk {
        fn name(&self) -> &str {
            "ok"
        }

        async fn send_one(&self, _recipient: &String) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_rejects_zero_batch_size() {
        let recipients = vec!["a@uni.example".to_string()];
        let err = dispatch(recipients, Arc::new(AlwaysOk), 0).await.unwrap_err();
        assert!(matches!(
            err,
            dispatcher::DispatchError::InvalidConfiguration { .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_course_announces_nothing() {
        let store = RecordStore::new();
        let course_id = store
            .add_course(contracts::Course::new("Compilers", "Dr. Rahimi"))
            .unwrap();
        let dispatcher = DispatcherBuilder::new().build().unwrap();
        let notifier = Arc::new(SelectiveNotifier {
            failing: vec![],
            attempts: AtomicUsize::new(0),
        });

        let announcement = announce_course_results(
            &store,
            course_id,
            &dispatcher,
            Arc::clone(&notifier),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(announcement.results.is_empty());
        assert_eq!(announcement.summary.workers, 0);
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 0);
    }
}
