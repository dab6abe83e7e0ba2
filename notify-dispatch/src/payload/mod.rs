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

//! Payload resolution layer.
//!
//! Decides what content accompanies a delivery: nothing, the event's embedded
//! snapshot, or a re-fetched current version, with optional version stripping.
//! Storage access stays behind the [`resolver::ResourceStore`] seam.

mod resolver;

pub use resolver::{PayloadResolver, Resolution, ResolvedContent, ResourceStore, StoreError};
