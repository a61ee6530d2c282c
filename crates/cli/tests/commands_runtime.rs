use std::env;
use std::fs;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use proposer_cli::commands::extract::TranscriptInput;
use proposer_cli::commands::propose::ProposeArgs;
use proposer_cli::commands::quote::QuoteArgs;
use proposer_cli::commands::{catalog, config, doctor, extract, migrate, propose, quote};
use proposer_core::CatalogKind;
use rust_decimal::Decimal;
use serde_json::Value;

const TRANSCRIPT: &str = "Olá, meu nome é Ana Souza, atuo como Diretora de RH. \
    Minha empresa é Acme Transportes, temos 120 funcionários e estamos na Europa. \
    O problema é que o onboarding é manual. Precisamos de integração com o ERP.";

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("PROPOSER_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("PROPOSER_DATABASE_URL", "postgres://localhost/proposer")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_env_sources() {
    with_env(
        &[("PROPOSER_DATABASE_URL", "sqlite::memory:"), ("PROPOSER_LOG_LEVEL", "debug")],
        || {
            let result = config::run();
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            let entries = payload["data"].as_array().expect("entries array");
            let entry = |key: &str| {
                entries.iter().find(|entry| entry["key"] == key).cloned().expect(key)
            };
            assert_eq!(entry("database.url")["source"], "env (PROPOSER_DATABASE_URL)");
            assert_eq!(entry("logging.level")["value"], "debug");
            assert_eq!(entry("logging.level")["source"], "env (PROPOSER_LOG_LEVEL)");
            assert_eq!(entry("proposal.validity_days")["source"], "default");
            assert_eq!(entry("proposal.validity_days")["value"], "30");
        },
    );
}

#[test]
fn doctor_passes_with_in_memory_database() {
    with_env(&[("PROPOSER_DATABASE_URL", "sqlite::memory:")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(report["checks"].as_array().map(Vec::len), Some(3));
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_fails() {
    with_env(&[("PROPOSER_PROPOSAL_VALIDITY_DAYS", "0")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 2);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] database_connectivity"));
    });
}

#[test]
fn catalog_lists_mobility_plans() {
    with_env(&[], || {
        let result = catalog::run(Some(CatalogKind::Mobility));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["kind"], "mobility");
        assert_eq!(payload["data"]["plans"].as_array().map(Vec::len), Some(3));
        assert_eq!(payload["data"]["segments"].as_array().map(Vec::len), Some(4));
    });
}

#[test]
fn extract_returns_facts_and_notices() {
    with_env(&[], || {
        let input = TranscriptInput { text: Some(TRANSCRIPT.to_string()), file: None };
        let result = extract::run(&input);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["facts"]["company_name"], "Acme Transportes");
        assert_eq!(payload["data"]["facts"]["employee_count"], 120);
        assert_eq!(payload["data"]["facts"]["segment"], "small");
        assert_eq!(payload["data"]["facts"]["region"], "europe");
    });
}

#[test]
fn extract_reports_missing_file_as_input_error() {
    with_env(&[], || {
        let input = TranscriptInput { text: None, file: Some("does/not/exist.txt".into()) };
        let result = extract::run(&input);
        assert_eq!(result.exit_code, 6);
        assert_eq!(parse_payload(&result.output)["error_class"], "input");
    });
}

#[test]
fn quote_prices_professional_plan() {
    with_env(&[], || {
        let args = QuoteArgs {
            plan: "professional".to_string(),
            units: 120,
            discount: Decimal::from(10),
            catalog: Some(CatalogKind::Workforce),
        };
        let result = quote::run(&args);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let total = payload["data"]["total_price"].as_str().expect("decimal string");
        assert_eq!(Decimal::from_str(total).expect("decimal"), Decimal::from(378));
        assert!(payload["message"].as_str().unwrap_or("").ends_with("378.00"));
    });
}

#[test]
fn quote_rejects_excessive_discount_with_domain_code() {
    with_env(&[], || {
        let args = QuoteArgs {
            plan: "starter".to_string(),
            units: 10,
            discount: Decimal::from(60),
            catalog: Some(CatalogKind::Workforce),
        };
        let result = quote::run(&args);
        assert_eq!(result.exit_code, 7);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_discount");
    });
}

#[test]
fn propose_writes_html_to_output_file() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let transcript = dir.path().join("call.txt");
        let output = dir.path().join("proposal.html");
        fs::write(&transcript, TRANSCRIPT).expect("write transcript");

        let mut args = propose_args("professional");
        args.transcript = Some(transcript);
        args.output = Some(output.clone());
        args.discount = Decimal::from(10);
        let result = propose::run(&args);
        assert_eq!(result.exit_code, 0, "{}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["company_name"], "Acme Transportes");
        assert_eq!(payload["data"]["total_price"], "378.00");

        let html = fs::read_to_string(&output).expect("proposal written");
        assert!(html.contains("Acme Transportes"));
        assert!(html.contains("€378.00"));
    });
}

#[test]
fn propose_from_facts_file_prints_html() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let facts = dir.path().join("facts.json");
        fs::write(
            &facts,
            r#"{"company_name":"Wayfarer Travel","contact_name":"Leo","employee_count":0,
                "region":"apac","segment":"otas"}"#,
        )
        .expect("write facts");

        let mut args = propose_args("starter");
        args.facts = Some(facts);
        args.catalog = Some(CatalogKind::Mobility);
        let result = propose::run(&args);
        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert!(result.output.starts_with("<!DOCTYPE html>"));
        assert!(result.output.contains("Wayfarer Travel"));
    });
}

#[test]
fn propose_reports_unknown_segment_and_bad_facts() {
    with_env(&[], || {
        let dir = tempfile::tempdir().expect("tempdir");
        let facts = dir.path().join("facts.json");
        fs::write(&facts, "{not json").expect("write facts");

        let mut args = propose_args("starter");
        args.facts = Some(facts);
        let result = propose::run(&args);
        assert_eq!(result.exit_code, 6);

        let transcript = dir.path().join("call.txt");
        fs::write(&transcript, TRANSCRIPT).expect("write transcript");
        let mut args = propose_args("starter");
        args.transcript = Some(transcript);
        args.segment = Some("pirates".to_string());
        let result = propose::run(&args);
        assert_eq!(result.exit_code, 7);
        assert_eq!(parse_payload(&result.output)["error_class"], "unknown_segment");
    });
}

fn propose_args(plan: &str) -> ProposeArgs {
    ProposeArgs {
        transcript: None,
        facts: None,
        segment: None,
        plan: plan.to_string(),
        units: None,
        discount: Decimal::ZERO,
        notes: None,
        validity_days: None,
        start_date: None,
        catalog: None,
        output: None,
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "PROPOSER_DATABASE_URL",
        "PROPOSER_DATABASE_MAX_CONNECTIONS",
        "PROPOSER_DATABASE_TIMEOUT_SECS",
        "PROPOSER_CATALOG_DEFAULT",
        "PROPOSER_PROPOSAL_VALIDITY_DAYS",
        "PROPOSER_PROPOSAL_NOTES_MAX_LEN",
        "PROPOSER_LOGGING_LEVEL",
        "PROPOSER_LOGGING_FORMAT",
        "PROPOSER_LOG_LEVEL",
        "PROPOSER_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
