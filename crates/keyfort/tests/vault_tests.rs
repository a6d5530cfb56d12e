// SPDX-FileCopyrightText: 2026 Keyfort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-stack tests through [`keyfort::open_vault`]: real SQLite metadata
//! store, real encrypted secret store, real dispatcher. Only platforms
//! outside the validation allow-list are used, so no network is touched.

use keyfort::{NewKeyRequest, SaveOutcome};
use keyfort_config::{KeyfortConfig, SecretsConfig};
use secrecy::{ExposeSecret, SecretString};

fn test_config(dir: &tempfile::TempDir) -> KeyfortConfig {
    let mut config = KeyfortConfig::default();
    config.storage.database_path = dir
        .path()
        .join("vault.db")
        .to_str()
        .unwrap()
        .to_string();
    // Low KDF cost for fast tests.
    config.secrets = SecretsConfig {
        kdf_memory_cost: 32768,
        kdf_iterations: 2,
        kdf_parallelism: 1,
    };
    config
}

fn new_request(name: &str, value: &str, platform: &str) -> NewKeyRequest {
    NewKeyRequest {
        display_name: name.to_string(),
        secret_value: value.to_string(),
        platform_name: platform.to_string(),
        custom_icon: None,
        note: None,
        validation_already_failed: false,
    }
}

#[tokio::test]
async fn vault_survives_reopen_with_the_same_passphrase() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let passphrase = SecretString::from("correct horse battery staple".to_string());

    let record = {
        let vault = keyfort::open_vault(&config, &passphrase).await.unwrap();
        match vault
            .save_new_key(new_request("ci token", "ghp_example123456", "GitHub"))
            .await
            .unwrap()
        {
            SaveOutcome::Saved { record } => record,
            other => panic!("expected Saved, got {other:?}"),
        }
        // Vault dropped here: simulates app shutdown.
    };

    let vault = keyfort::open_vault(&config, &passphrase).await.unwrap();
    let reloaded = vault.get_key(record.id).await.unwrap().unwrap();
    assert_eq!(reloaded.display_name, "ci token");

    let revealed = vault.reveal_secret(&reloaded).await.unwrap().unwrap();
    assert_eq!(revealed.expose_secret(), "ghp_example123456");
}

#[tokio::test]
async fn wrong_passphrase_fails_to_open_an_existing_vault() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let vault = keyfort::open_vault(&config, &SecretString::from("right".to_string()))
        .await
        .unwrap();
    drop(vault);

    let result = keyfort::open_vault(&config, &SecretString::from("wrong".to_string())).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn duplicate_detection_works_over_the_real_encrypted_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let passphrase = SecretString::from("pass".to_string());

    let vault = keyfort::open_vault(&config, &passphrase).await.unwrap();
    let first = match vault
        .save_new_key(new_request("original", "shared-value", "Reve AI"))
        .await
        .unwrap()
    {
        SaveOutcome::Saved { record } => record,
        other => panic!("expected Saved, got {other:?}"),
    };

    let outcome = vault
        .save_new_key(new_request("copy", "shared-value", "GitHub"))
        .await
        .unwrap();

    match outcome {
        SaveOutcome::Duplicate {
            existing,
            platform_name,
        } => {
            assert_eq!(existing.id, first.id);
            assert_eq!(platform_name, "Reve AI");
        }
        other => panic!("expected Duplicate, got {other:?}"),
    }
}

#[tokio::test]
async fn allow_list_is_wired_through_the_facade() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let vault = keyfort::open_vault(&config, &SecretString::from("pass".to_string()))
        .await
        .unwrap();

    for platform in ["Anthropic", "DeepSeek", "Gemini", "OpenAI", "Hailuo"] {
        assert!(vault.supports_validation(platform), "{platform}");
    }
    for platform in ["Reve AI", "GitHub", "Google Image Search", "CustomTool"] {
        assert!(!vault.supports_validation(platform), "{platform}");
    }
}
