// src/notify/alert.rs
use chrono_tz::Tz;

use crate::error::NotifyError;
use crate::feed::Event;

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::Asia::Shanghai;

/// Rendered push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

/// Title carries local time + magnitude, body carries place, coordinates, depth.
pub fn format_alert(event: &Event, tz: Tz) -> Result<Alert, NotifyError> {
    let local = event
        .started_at()
        .ok_or(NotifyError::Timestamp(event.start_at))?
        .with_timezone(&tz);

    let title = format!(
        "{} 有{:.1}级地震发生了",
        local.format("%Y-%m-%d %H:%M:%S"),
        event.magnitude
    );
    let body = format!(
        "地点:{},东经:{:.6}°,北纬:{:.6}°,地震深度:{:.1}公里",
        event.epicenter, event.longitude, event.latitude, event.depth
    );

    Ok(Alert { title, body })
}
