//! Implementation of the `doctor` diagnostics used by the CLI.
//!
//! Each check has an identifier, a status ("pass", "warn" or "fail") and a
//! summary. The overall status is the worst status across all checks.

use crate::abbreviation::{AbbreviationTable, NEW_AGE, TIME_ZONES};
use crate::config::{self, Settings};
use serde::Serialize;
use std::collections::HashSet;
use std::env;
use std::io;
use std::net::{TcpListener, ToSocketAddrs};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub version: String,
    pub overall: String,
    pub checks: Vec<DoctorCheck>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DoctorCheck {
    pub id: String,
    pub status: String,
    pub summary: String,
}

fn mk(id: &str, status: &str, summary: impl Into<String>) -> DoctorCheck {
    DoctorCheck {
        id: id.to_string(),
        status: status.to_string(),
        summary: summary.into(),
    }
}

fn aggregate_overall(checks: &[DoctorCheck]) -> String {
    // fail > warn > pass
    if checks.iter().any(|c| c.status == "fail") {
        "fail".to_string()
    } else if checks.iter().any(|c| c.status == "warn") {
        "warn".to_string()
    } else {
        "pass".to_string()
    }
}

fn resolve_check(addr: &str) -> Result<usize, String> {
    let addrs: Vec<_> = addr
        .to_socket_addrs()
        .map_err(|e| format!("cannot resolve listen address {}: {}", addr, e))?
        .collect();
    if addrs.is_empty() {
        Err(format!("listen address {} resolved to nothing", addr))
    } else {
        Ok(addrs.len())
    }
}

fn bind_check(addr: &str) -> DoctorCheck {
    match TcpListener::bind(addr) {
        Ok(_) => mk("listen.bind", "pass", format!("{} is free", addr)),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => mk(
            "listen.bind",
            "warn",
            format!("{} is already in use (server running?)", addr),
        ),
        Err(e) => mk("listen.bind", "fail", format!("cannot bind {}: {}", addr, e)),
    }
}

fn table_check(table: &AbbreviationTable) -> Result<(), String> {
    let mut seen = HashSet::new();
    for code in table.codes() {
        if code.is_empty() || code.to_uppercase() != code {
            return Err(format!("{} code {:?} is not uppercase", table.label(), code));
        }
        if !seen.insert(code) {
            return Err(format!("{} code {} is duplicated", table.label(), code));
        }
    }
    Ok(())
}

fn tables_check() -> DoctorCheck {
    let result = table_check(&TIME_ZONES).and_then(|_| table_check(&NEW_AGE));
    match result {
        Ok(()) => mk(
            "tables.integrity",
            "pass",
            format!(
                "{} time zone and {} new age abbreviations",
                TIME_ZONES.entries().len(),
                NEW_AGE.entries().len()
            ),
        ),
        Err(e) => mk("tables.integrity", "fail", e),
    }
}

pub fn doctor_check() -> DoctorReport {
    let mut checks = Vec::new();

    let cfg = match config::load_config_or_default() {
        Ok((cfg, Some(path))) => {
            checks.push(mk("cfg.load", "pass", format!("loaded {}", path.display())));
            Some(cfg)
        }
        Ok((cfg, None)) => {
            checks.push(mk(
                "cfg.load",
                "pass",
                "no config file; using defaults (set TOOLBELT_CONFIG to use one)",
            ));
            Some(cfg)
        }
        Err(e) => {
            checks.push(mk("cfg.load", "fail", e.to_string()));
            None
        }
    };

    let settings = match &cfg {
        Some(cfg) => match cfg.validate() {
            Ok(()) => match Settings::from_config(cfg).apply_env() {
                Ok(settings) => {
                    checks.push(mk("cfg.validate", "pass", "config ok"));
                    Some(settings)
                }
                Err(e) => {
                    checks.push(mk("cfg.validate", "fail", e.to_string()));
                    None
                }
            },
            Err(e) => {
                checks.push(mk("cfg.validate", "fail", e.to_string()));
                None
            }
        },
        None => {
            checks.push(mk(
                "cfg.validate",
                "warn",
                "skipped because config load failed",
            ));
            None
        }
    };

    match &settings {
        Some(settings) => {
            let addr = settings.listen_addr();
            match resolve_check(&addr) {
                Ok(count) => {
                    checks.push(mk(
                        "listen.resolve",
                        "pass",
                        format!("{} resolved to {} address(es)", addr, count),
                    ));
                    match env::var("TOOLBELT_DOCTOR_BIND").as_deref() {
                        Ok("pass") => checks.push(mk(
                            "listen.bind",
                            "pass",
                            "forced pass via TOOLBELT_DOCTOR_BIND",
                        )),
                        Ok("fail") => checks.push(mk(
                            "listen.bind",
                            "fail",
                            "forced fail via TOOLBELT_DOCTOR_BIND",
                        )),
                        Ok("skip") => checks.push(mk(
                            "listen.bind",
                            "warn",
                            "skipped via TOOLBELT_DOCTOR_BIND",
                        )),
                        _ => checks.push(bind_check(&addr)),
                    }
                }
                Err(e) => {
                    checks.push(mk("listen.resolve", "fail", e));
                    checks.push(mk(
                        "listen.bind",
                        "warn",
                        "skipped because listen.resolve failed",
                    ));
                }
            }
        }
        None => {
            checks.push(mk(
                "listen.resolve",
                "warn",
                "skipped because config is unusable",
            ));
            checks.push(mk(
                "listen.bind",
                "warn",
                "skipped because config is unusable",
            ));
        }
    }

    checks.push(tables_check());

    let overall = aggregate_overall(&checks);
    DoctorReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        overall,
        checks,
    }
}
