use school_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_TTL_SECONDS",
    "MAX_UPLOAD_BYTES",
    "S3_ENDPOINT",
    "S3_REGION",
    "S3_ACCESS_KEY",
    "S3_SECRET_KEY",
    "S3_BUCKET_NAME",
    "S3_PUBLIC_URL",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
];

/// Runs `test` with the given variables set (and every other config variable unset),
/// then restores the environment even if the test panicked.
fn with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    unsafe {
        for (key, original) in originals {
            match original {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

#[test]
#[serial]
fn test_local_env_defaults() {
    let config = with_env(
        &[("APP_ENV", "local"), ("DATABASE_URL", "postgres://u:p@host/db")],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.s3_endpoint, "http://localhost:9000");
    assert_eq!(config.s3_region, "us-east-1");
    assert_eq!(config.s3_bucket, "school-portal");
    assert_eq!(config.s3_public_url, "http://localhost:9000/school-portal");
    assert_eq!(config.jwt_secret, "super-secure-test-secret-value-local");
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(config.jwt_ttl_seconds, 86_400);
    assert!(config.admin_email.is_none());
}

#[test]
#[serial]
fn test_missing_app_env_means_local() {
    let config = with_env(&[("DATABASE_URL", "postgres://u:p@host/db")], AppConfig::load);
    assert_eq!(config.env, Env::Local);
}

#[test]
#[serial]
fn test_numeric_overrides_are_parsed() {
    let config = with_env(
        &[
            ("DATABASE_URL", "postgres://u:p@host/db"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("JWT_TTL_SECONDS", "60"),
            ("ADMIN_EMAIL", "root@school.test"),
            ("ADMIN_PASSWORD", "root-password"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.max_upload_bytes, 1024);
    assert_eq!(config.jwt_ttl_seconds, 60);
    assert_eq!(config.admin_email.as_deref(), Some("root@school.test"));
}

#[test]
#[serial]
fn test_unparsable_number_fails_fast() {
    let result = with_env(
        &[
            ("DATABASE_URL", "postgres://u:p@host/db"),
            ("MAX_UPLOAD_BYTES", "lots"),
        ],
        || panic::catch_unwind(AppConfig::load),
    );
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_production_fails_fast_on_missing_secrets() {
    let result = with_env(
        &[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://u:p@host/db"),
            ("S3_ENDPOINT", "https://s3.example.com"),
        ],
        || panic::catch_unwind(AppConfig::load),
    );

    assert!(
        result.is_err(),
        "Production config loading should panic on missing secrets"
    );
}

const PRODUCTION_VARS: &[(&str, &str)] = &[
    ("APP_ENV", "production"),
    ("DATABASE_URL", "postgres://u:p@host/db"),
    ("JWT_SECRET", "prod-secret"),
    ("S3_ENDPOINT", "https://s3.example.com"),
    ("S3_REGION", "ap-southeast-1"),
    ("S3_ACCESS_KEY", "key"),
    ("S3_SECRET_KEY", "secret"),
    ("S3_BUCKET_NAME", "portal-media"),
    ("S3_PUBLIC_URL", "https://cdn.example.com/portal-media"),
];

#[test]
#[serial]
fn test_production_with_every_secret_loads() {
    let config = with_env(PRODUCTION_VARS, AppConfig::load);

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.s3_region, "ap-southeast-1");
    assert_eq!(config.s3_public_url, "https://cdn.example.com/portal-media");
}

#[test]
#[serial]
fn test_production_requires_s3_region() {
    let vars: Vec<(&str, &str)> = PRODUCTION_VARS
        .iter()
        .copied()
        .filter(|(key, _)| *key != "S3_REGION")
        .collect();

    let result = with_env(&vars, || panic::catch_unwind(AppConfig::load));

    assert!(result.is_err());
}
