// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod geo;
pub mod health;
pub mod metrics;
pub mod players;
pub mod plans;
