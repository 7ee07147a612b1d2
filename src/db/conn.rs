//! Connection-string negotiation.
//!
//! A database section can describe up to three ways of reaching SQL Server: a
//! fully specified driver connection string, integrated security (SSO), and
//! basic username/password authentication. Strategies are attempted in that
//! order and the first string that produces a live connection wins; when every
//! strategy fails the last error is surfaced.

use tracing::{error, info};

use crate::db::client::SqlClient;
use crate::error::{EtlError, Result};

/// Database settings read from the `[DatabaseConfig]` section.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Whether integrated security should be attempted.
    pub sso: bool,
    /// Fully specified connection string, attempted first when present.
    pub driver_conn: Option<String>,
}

/// One authentication strategy for reaching the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Use the connection string from the config verbatim.
    Driver,
    /// Integrated security.
    Sso,
    /// Username and password.
    Basic,
}

impl std::fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthStrategy::Driver => write!(f, "driver"),
            AuthStrategy::Sso => write!(f, "sso"),
            AuthStrategy::Basic => write!(f, "basic"),
        }
    }
}

impl DbSettings {
    /// Candidate strategies in attempt order. Basic auth is always the final
    /// fallback.
    pub fn strategies(&self) -> Vec<AuthStrategy> {
        let mut candidates = Vec::with_capacity(3);
        if self.driver_conn.is_some() {
            candidates.push(AuthStrategy::Driver);
        }
        if self.sso {
            candidates.push(AuthStrategy::Sso);
        }
        candidates.push(AuthStrategy::Basic);
        candidates
    }

    /// Builds the ADO-style connection string for one strategy.
    pub fn connection_string(&self, strategy: AuthStrategy) -> String {
        match strategy {
            AuthStrategy::Driver => self.driver_conn.clone().unwrap_or_default(),
            AuthStrategy::Sso => format!(
                "Server={};Database={};IntegratedSecurity=true;TrustServerCertificate=true",
                self.server, self.database
            ),
            AuthStrategy::Basic => format!(
                "Server={};Database={};User ID={};Password={};TrustServerCertificate=true",
                self.server, self.database, self.username, self.password
            ),
        }
    }
}

/// Seam for testing the fallback policy without a database.
pub trait ConnectionProbe {
    /// Attempts to open (and immediately close) a connection.
    fn probe(&mut self, conn_str: &str) -> Result<()>;
}

/// Probe that opens a real connection through the driver.
pub struct TiberiusProbe;

impl ConnectionProbe for TiberiusProbe {
    fn probe(&mut self, conn_str: &str) -> Result<()> {
        SqlClient::connect(conn_str).map(|_| ())
    }
}

/// Resolves the connection string to use for this run.
///
/// Each candidate strategy is probed in order; the first string that connects
/// is returned. Failures are logged per strategy and the last one is surfaced
/// when no strategy succeeds.
pub fn resolve_connection_string(
    settings: &DbSettings,
    probe: &mut dyn ConnectionProbe,
) -> Result<String> {
    let mut last_error = None;
    for strategy in settings.strategies() {
        let conn_str = settings.connection_string(strategy);
        match probe.probe(&conn_str) {
            Ok(()) => {
                info!(%strategy, "database connection successful");
                return Ok(conn_str);
            }
            Err(err) => {
                error!(%strategy, %err, "database connection failed");
                last_error = Some(err);
            }
        }
    }
    Err(EtlError::AllConnectionsFailed {
        last: last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no strategies configured".to_string()),
    })
}

/// Negotiates a connection string and opens a client with it.
pub fn connect_with_fallback(settings: &DbSettings) -> Result<SqlClient> {
    let conn_str = resolve_connection_string(settings, &mut TiberiusProbe)?;
    SqlClient::connect(&conn_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sso: bool, driver_conn: Option<&str>) -> DbSettings {
        DbSettings {
            server: "sqlhost".to_string(),
            database: "analytics".to_string(),
            username: "svc_provider".to_string(),
            password: "secret".to_string(),
            sso,
            driver_conn: driver_conn.map(str::to_string),
        }
    }

    struct ScriptedProbe {
        outcomes: Vec<std::result::Result<(), &'static str>>,
        attempts: Vec<String>,
    }

    impl ScriptedProbe {
        fn new(outcomes: Vec<std::result::Result<(), &'static str>>) -> Self {
            Self {
                outcomes,
                attempts: Vec::new(),
            }
        }
    }

    impl ConnectionProbe for ScriptedProbe {
        fn probe(&mut self, conn_str: &str) -> Result<()> {
            self.attempts.push(conn_str.to_string());
            match self.outcomes.remove(0) {
                Ok(()) => Ok(()),
                Err(message) => Err(EtlError::Io(std::io::Error::other(message))),
            }
        }
    }

    #[test]
    fn strategy_order_follows_configuration() {
        assert_eq!(
            settings(true, Some("Server=custom")).strategies(),
            vec![AuthStrategy::Driver, AuthStrategy::Sso, AuthStrategy::Basic]
        );
        assert_eq!(
            settings(false, None).strategies(),
            vec![AuthStrategy::Basic]
        );
        assert_eq!(
            settings(true, None).strategies(),
            vec![AuthStrategy::Sso, AuthStrategy::Basic]
        );
    }

    #[test]
    fn connection_strings_are_well_formed() {
        let settings = settings(true, Some("Server=custom;Database=x"));
        assert_eq!(
            settings.connection_string(AuthStrategy::Driver),
            "Server=custom;Database=x"
        );
        let sso = settings.connection_string(AuthStrategy::Sso);
        assert!(sso.contains("Server=sqlhost"));
        assert!(sso.contains("Database=analytics"));
        assert!(sso.contains("IntegratedSecurity=true"));
        assert!(!sso.contains("Password"));
        let basic = settings.connection_string(AuthStrategy::Basic);
        assert!(basic.contains("User ID=svc_provider"));
        assert!(basic.contains("Password=secret"));
    }

    #[test]
    fn falls_back_to_next_strategy_on_failure() {
        let settings = settings(true, Some("Server=custom"));
        let mut probe = ScriptedProbe::new(vec![Err("driver down"), Ok(())]);
        let resolved =
            resolve_connection_string(&settings, &mut probe).expect("fallback succeeded");
        assert!(resolved.contains("IntegratedSecurity=true"));
        assert_eq!(probe.attempts.len(), 2);
    }

    #[test]
    fn surfaces_last_error_when_everything_fails() {
        let settings = settings(true, None);
        let mut probe = ScriptedProbe::new(vec![Err("sso down"), Err("bad password")]);
        match resolve_connection_string(&settings, &mut probe) {
            Err(EtlError::AllConnectionsFailed { last }) => {
                assert!(last.contains("bad password"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(probe.attempts.len(), 2);
    }

    #[test]
    fn stops_at_first_successful_strategy() {
        let settings = settings(true, Some("Server=custom"));
        let mut probe = ScriptedProbe::new(vec![Ok(())]);
        let resolved = resolve_connection_string(&settings, &mut probe).expect("driver succeeded");
        assert_eq!(resolved, "Server=custom");
        assert_eq!(probe.attempts, vec!["Server=custom".to_string()]);
    }
}
