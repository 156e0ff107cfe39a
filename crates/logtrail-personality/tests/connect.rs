mod common;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use common::{signer, TREE_ID};
use logtrail_personality::memory::{Integration, MemoryLog};
use logtrail_personality::{
    ConfigError, Connector, ErrorKind, LogService, LogServiceError, Personality,
    PersonalityConfig, PersonalityError, RequestContext,
};
use parking_lot::Mutex;

enum Behaviour {
    Serve(Arc<MemoryLog>),
    Refuse,
    Hang,
}

struct ScriptedConnector {
    behaviour: Behaviour,
    dialed: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            dialed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, addr: &str) -> Result<Arc<dyn LogService>, LogServiceError> {
        self.dialed.lock().push(addr.to_string());
        match &self.behaviour {
            Behaviour::Serve(log) => Ok(log.clone()),
            Behaviour::Refuse => Err(LogServiceError::Unavailable(format!("{} refused", addr))),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

#[tokio::test]
async fn connects_to_the_configured_address() {
    let log = Arc::new(MemoryLog::with_entries(TREE_ID, Integration::Immediate, 2));
    let connector = ScriptedConnector::new(Behaviour::Serve(log));
    let mut config = common::config();
    config.log_addr = "trillian.internal:8090".to_string();

    let personality = Personality::connect(config, &connector, Arc::new(signer()))
        .await
        .unwrap();

    assert_eq!(*connector.dialed.lock(), vec!["trillian.internal:8090"]);
    let checkpoint = personality.checkpoint(&RequestContext::new()).await.unwrap();
    assert_eq!(checkpoint.size, 2);
}

#[tokio::test]
async fn refused_connection_is_a_connectivity_error() {
    let connector = ScriptedConnector::new(Behaviour::Refuse);

    let err = Personality::connect(common::config(), &connector, Arc::new(signer()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test(start_paused = true)]
async fn connection_attempt_is_bounded() {
    let connector = ScriptedConnector::new(Behaviour::Hang);
    let mut config = common::config();
    config.connect_timeout_ms = 1_500;
    let start = tokio::time::Instant::now();

    let err = Personality::connect(config, &connector, Arc::new(signer()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connectivity);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1_500) && elapsed < Duration::from_secs(2));
}

#[tokio::test]
async fn invalid_tree_id_is_rejected_before_dialing() {
    let connector = ScriptedConnector::new(Behaviour::Refuse);

    let config = PersonalityConfig::for_tree(0);

    let err = Personality::connect(config, &connector, Arc::new(signer()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PersonalityError::Config(ConfigError::Invalid {
            field: "tree_id",
            ..
        })
    ));
    assert!(connector.dialed.lock().is_empty());
}

#[test]
fn construction_validates_the_config() {
    let log = Arc::new(MemoryLog::new(-3, Integration::Immediate));
    let err =
        Personality::new(PersonalityConfig::for_tree(-3), log, Arc::new(signer())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
