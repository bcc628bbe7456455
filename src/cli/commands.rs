//! Subcommand handlers.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::adapters::json_store::JsonUserFile;
use crate::adapters::vitals_file::{export_patient, load_document};
use crate::application::{Assessment, CredentialStore, VitalsEvaluator};
use crate::config::Config;
use crate::domain::VitalsDocument;
use crate::ports::PasswordScheme;
use crate::{Result, VitalwatchError};

use super::render::{render_dashboard, render_patient_list, RenderOptions};
use super::session::{CurrentUser, Page, SessionContext};
use super::Command;

type Store = CredentialStore<JsonUserFile, Box<dyn PasswordScheme>>;

fn open_store(config: &Config) -> Result<Store> {
    let scheme = config.password_scheme()?;
    tracing::debug!(
        scheme = scheme.name(),
        "Opening user store at {:?}",
        config.users_file
    );
    Ok(CredentialStore::new(
        Arc::new(JsonUserFile::new(&config.users_file)),
        scheme,
    ))
}

/// Read one line from `input` as a password, without the line ending.
///
/// # Errors
/// Returns error if `input` cannot be read.
pub fn read_password<R: BufRead>(input: &mut R) -> std::io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Assess every patient in `document`, or only `patient` when given.
///
/// # Errors
/// Returns `UnknownPatient` if `patient` is not in the document, or a
/// validation error for a reading that fails its checks.
pub fn assess_document(
    document: &VitalsDocument,
    patient: Option<&str>,
) -> Result<BTreeMap<String, Assessment>> {
    let evaluator = VitalsEvaluator::new();
    let selected: Vec<(&String, _)> = match patient {
        Some(id) => {
            let (id, reading) = document
                .get_key_value(id)
                .ok_or_else(|| VitalwatchError::UnknownPatient(id.to_string()))?;
            vec![(id, reading)]
        }
        None => document.iter().collect(),
    };

    selected
        .into_iter()
        .map(|(id, reading)| -> Result<(String, Assessment)> {
            Ok((id.clone(), evaluator.assess(reading)?))
        })
        .collect()
}

/// Run one subcommand.
///
/// Passwords are read from `input`; everything user-facing goes to `output`.
///
/// # Errors
/// Returns the first failure from the store, the vitals file, or the session.
pub fn run<R: BufRead, W: Write>(
    command: Command,
    config: &Config,
    input: &mut R,
    output: &mut W,
    opts: RenderOptions,
) -> Result<()> {
    match command {
        Command::Register { username, role } => {
            let mut session = SessionContext::starting_at(Page::Register)?;
            let store = open_store(config)?;
            let password = read_password(input)?;
            store.register(&username, &password, role)?;
            session.show_login()?;
            writeln!(
                output,
                "Registered '{username}' as {}. Sign in with: vitalwatch login {username}",
                role.unwrap_or_default()
            )?;
        }
        Command::Login { username, patient } => {
            let mut session = SessionContext::new();
            let store = open_store(config)?;
            let password = read_password(input)?;
            let Some(record) = store.authenticate(&username, &password)? else {
                return Err(VitalwatchError::AuthenticationFailed);
            };

            let user = CurrentUser::from(record);
            session.sign_in(user.clone())?;

            let document = load_document(&config.vitals_file)?;
            let assessments = assess_document(&document, patient.as_deref())?;
            let dashboard = render_dashboard(
                &user,
                assessments.iter().map(|(id, a)| (id.as_str(), a)),
                opts,
            );
            output.write_all(dashboard.as_bytes())?;

            session.logout()?;
        }
        Command::Assess { patient } => {
            let document = load_document(&config.vitals_file)?;
            let assessments = assess_document(&document, patient.as_deref())?;
            let alerting = assessments.values().filter(|a| !a.alerts.is_empty()).count();
            tracing::info!(
                "Assessed {} patients, {} with alerts",
                assessments.len(),
                alerting
            );
            serde_json::to_writer_pretty(&mut *output, &assessments)?;
            writeln!(output)?;
        }
        Command::Patients => {
            let document = load_document(&config.vitals_file)?;
            let assessments = assess_document(&document, None)?;
            let list = render_patient_list(
                assessments.iter().map(|(id, a)| (id.as_str(), a)),
                opts,
            );
            output.write_all(list.as_bytes())?;
        }
        Command::Export {
            patient,
            output: target,
        } => {
            let document = load_document(&config.vitals_file)?;
            let reading = document
                .get(&patient)
                .ok_or_else(|| VitalwatchError::UnknownPatient(patient.clone()))?;
            let json = export_patient(&patient, reading)?;
            match target {
                Some(path) => {
                    std::fs::write(&path, format!("{json}\n"))?;
                    tracing::info!("Exported patient {} to {:?}", patient, path);
                }
                None => writeln!(output, "{json}")?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::vitals_file::parse_document;
    use crate::config::HashSchemeKind;
    use crate::domain::Role;
    use std::io::Cursor;
    use tempfile::{tempdir, TempDir};

    const VITALS: &str = r#"{
        "P001": {"temperature": 39.2, "heart_rate": 110, "spo2": 90, "bp": "130/85", "respiratory_rate": 18},
        "P002": {"temperature": 36.8, "heart_rate": 78, "spo2": 97, "bp": "120/80", "respiratory_rate": 16}
    }"#;

    fn setup() -> (TempDir, Config) {
        let dir = tempdir().expect("Should create temp dir");
        let vitals = dir.path().join("vitals.json");
        std::fs::write(&vitals, VITALS).expect("Should write vitals");

        let mut config = Config::default();
        config.users_file = dir.path().join("users.json");
        config.vitals_file = vitals;
        config.hash_scheme = HashSchemeKind::Legacy;
        (dir, config)
    }

    fn exec(command: Command, config: &Config, stdin: &str) -> Result<String> {
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut output = Vec::new();
        run(command, config, &mut input, &mut output, RenderOptions::default())?;
        Ok(String::from_utf8(output).expect("utf-8 output"))
    }

    fn register(config: &Config, username: &str, password: &str) -> Result<String> {
        exec(
            Command::Register {
                username: username.to_string(),
                role: Some(Role::Doctor),
            },
            config,
            &format!("{password}\n"),
        )
    }

    #[test]
    fn test_read_password_strips_line_ending() {
        let mut input = Cursor::new(b"hunter2\r\nrest".to_vec());
        assert_eq!(read_password(&mut input).expect("read").as_str(), "hunter2");

        let mut empty = Cursor::new(Vec::new());
        assert_eq!(read_password(&mut empty).expect("read").as_str(), "");
    }

    #[test]
    fn test_register_then_login_shows_dashboard() {
        let (_dir, config) = setup();
        let text = register(&config, "alice", "pw").expect("Should register");
        assert!(text.contains("Registered 'alice' as Doctor"));

        let dashboard = exec(
            Command::Login {
                username: "alice".to_string(),
                patient: None,
            },
            &config,
            "pw\n",
        )
        .expect("Should log in");
        assert!(dashboard.contains("alice · Doctor"));
        assert!(dashboard.contains("Patient P001  [CRITICAL]"));
        assert!(dashboard.contains("Patient P002  [NORMAL]"));
    }

    #[test]
    fn test_failed_login_shows_nothing() {
        let (_dir, config) = setup();
        register(&config, "alice", "pw").expect("Should register");

        let err = exec(
            Command::Login {
                username: "alice".to_string(),
                patient: None,
            },
            &config,
            "wrong\n",
        )
        .expect_err("Should refuse");
        assert!(matches!(err, VitalwatchError::AuthenticationFailed));
    }

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let (_dir, config) = setup();
        register(&config, "alice", "pw").expect("Should register");
        let err = register(&config, "alice", "other").expect_err("Should refuse");
        assert!(matches!(err, VitalwatchError::Registration(_)));
    }

    #[test]
    fn test_assess_outputs_json_for_selected_patient() {
        let (_dir, config) = setup();
        let text = exec(
            Command::Assess {
                patient: Some("P001".to_string()),
            },
            &config,
            "",
        )
        .expect("Should assess");

        let value: serde_json::Value = serde_json::from_str(&text).expect("JSON output");
        let alerts = value["P001"]["alerts"].as_array().expect("alerts array");
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0]["message"], "Low oxygen!");
        assert!(value.get("P002").is_none());
    }

    #[test]
    fn test_unknown_patient() {
        let (_dir, config) = setup();
        let err = exec(
            Command::Export {
                patient: "P999".to_string(),
                output: None,
            },
            &config,
            "",
        )
        .expect_err("Should fail");
        assert!(matches!(err, VitalwatchError::UnknownPatient(ref id) if id == "P999"));
    }

    #[test]
    fn test_export_to_file_round_trips() {
        let (dir, config) = setup();
        let target = dir.path().join("p002.json");
        exec(
            Command::Export {
                patient: "P002".to_string(),
                output: Some(target.clone()),
            },
            &config,
            "",
        )
        .expect("Should export");

        let exported = std::fs::read_to_string(&target).expect("Should read export");
        let original = parse_document(VITALS).expect("Should parse");
        let back = parse_document(&exported).expect("Should parse export");
        assert_eq!(back.get("P002"), original.get("P002"));
    }

    #[test]
    fn test_patients_lists_every_id() {
        let (_dir, config) = setup();
        let text = exec(Command::Patients, &config, "").expect("Should list");
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("P001"));
    }
}
