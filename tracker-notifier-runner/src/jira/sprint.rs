// Copyright (c) The tracker-notifier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Sprint;
use chrono::{DateTime, Utc};

/// Selects the sprint that new and recurring failures are scheduled into.
///
/// A sprint whose window strictly contains `now` wins outright (the first one, if windows
/// overlap). Otherwise the sprint that has already started with the latest end date is chosen,
/// which covers the gap between one sprint ending and the next being started. Sprints lacking
/// either date are never selected.
pub fn select_active_sprint(sprints: &[Sprint], now: DateTime<Utc>) -> Option<&Sprint> {
    let mut latest_started: Option<(&Sprint, DateTime<Utc>)> = None;

    for sprint in sprints {
        let (Some(start), Some(end)) = (sprint.start_date, sprint.end_date) else {
            continue;
        };
        if start >= now {
            continue;
        }
        if end > now {
            return Some(sprint);
        }
        match latest_started {
            Some((_, latest_end)) if latest_end >= end => {}
            _ => latest_started = Some((sprint, end)),
        }
    }

    latest_started.map(|(sprint, _)| sprint)
}
