/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! File-backed [`SubscriptionRegistry`] for tests and demos.
//!
//! Reads a JSON array of canonical subscription definitions from a static
//! file on every `list_active` call, so edits to the file are visible to the
//! next dispatch cycle without a restart. Entries that fail to deserialize
//! are skipped with an error log rather than failing the whole listing.

use async_trait::async_trait;
use serde_json::Value;
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use subscription_cache::{CanonicalSubscription, RegistryError, SubscriptionRegistry};
use tracing::{debug, error};

pub struct StaticFileRegistry {
    static_file: String,
}

impl StaticFileRegistry {
    pub fn new(static_file: String) -> Self {
        Self { static_file }
    }

    fn canonicalized_static_file_path(&self) -> Result<PathBuf, RegistryError> {
        let subscription_json_file = PathBuf::from(self.static_file.clone());
        debug!("subscription_json_file: {subscription_json_file:?}");

        canonicalize(subscription_json_file).map_err(|error| {
            RegistryError::new(format!("static subscription file not found: {error:?}"))
        })
    }

    fn read_static_config_json(&self) -> Result<Value, RegistryError> {
        let subscription_json_file = self.canonicalized_static_file_path()?;
        let data = fs::read_to_string(subscription_json_file)
            .map_err(|error| RegistryError::new(format!("unable to read file: {error:?}")))?;

        serde_json::from_str(&data)
            .map_err(|error| RegistryError::new(format!("unable to parse JSON: {error:?}")))
    }

    fn parse_static_subscriptions(&self) -> Result<Vec<CanonicalSubscription>, RegistryError> {
        let value = self.read_static_config_json()?;
        let Some(entries) = value.as_array() else {
            return Err(RegistryError::new(
                "static subscription file must be a JSON array of canonical subscription objects",
            ));
        };

        let mut subscriptions = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<CanonicalSubscription>(entry.clone()) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(error) => {
                    error!("error deserializing subscription entry '{entry}': {error}");
                }
            }
        }

        Ok(subscriptions)
    }
}

#[async_trait]
impl SubscriptionRegistry for StaticFileRegistry {
    async fn list_active(&self) -> Result<Vec<CanonicalSubscription>, RegistryError> {
        let subscriptions = self.parse_static_subscriptions()?;
        Ok(subscriptions
            .into_iter()
            .filter(CanonicalSubscription::is_active)
            .collect())
    }
}
