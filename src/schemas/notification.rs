use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Notification;
use crate::db::types::NotificationType;

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationListQuery {
    #[serde(default, rename = "type")]
    pub(crate) ntype: Option<NotificationType>,
    #[serde(default)]
    pub(crate) is_read: Option<bool>,
    #[serde(default)]
    pub(crate) page: Option<u64>,
    #[serde(default)]
    pub(crate) page_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationResponse {
    pub(crate) id: String,
    pub(crate) ntype: NotificationType,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) course_id: Option<String>,
    pub(crate) course_title: Option<String>,
    pub(crate) is_read: bool,
    pub(crate) metadata: serde_json::Value,
    pub(crate) created_at: String,
}

impl NotificationResponse {
    pub(crate) fn from_db(notification: Notification) -> Self {
        Self {
            id: notification.id,
            ntype: notification.ntype,
            title: notification.title,
            message: notification.message,
            course_id: notification.course_id,
            course_title: notification.course_title,
            is_read: notification.is_read,
            metadata: notification.metadata.0,
            created_at: format_primitive(notification.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UnreadCountResponse {
    pub(crate) unread: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkAllReadResponse {
    pub(crate) marked: u64,
}
