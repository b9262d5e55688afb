//! Click event model for asynchronous click tracking.

use crate::domain::entities::NewClick;

/// An in-memory representation of a click, handed from the redirect handler to
/// the background worker through a bounded channel.
///
/// The event owns all its data, so it outlives the request that produced it.
///
/// # Usage Flow
///
/// 1. Created in the redirect handler after a successful resolution
/// 2. Sent to the channel with `try_send` (never awaited)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Converted to [`NewClick`] for persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl ClickEvent {
    /// Creates a new click event.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(
    ///     42,
    ///     "abc123".to_string(),
    ///     Some("192.168.1.1".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    /// );
    /// ```
    pub fn new(
        link_id: i64,
        code: String,
        ip: Option<String>,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            code,
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referer: referer.map(|s| s.to_string()),
        }
    }
}

impl From<ClickEvent> for NewClick {
    fn from(ev: ClickEvent) -> Self {
        NewClick {
            link_id: ev.link_id,
            user_agent: ev.user_agent,
            referer: ev.referer,
            ip: ev.ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation_full() {
        let event = ClickEvent::new(
            42,
            "abc123".to_string(),
            Some("192.168.1.1".to_string()),
            Some("Mozilla/5.0"),
            Some("https://google.com"),
        );

        assert_eq!(event.link_id, 42);
        assert_eq!(event.code, "abc123");
        assert_eq!(event.ip, Some("192.168.1.1".to_string()));
        assert_eq!(event.user_agent, Some("Mozilla/5.0".to_string()));
        assert_eq!(event.referer, Some("https://google.com".to_string()));
    }

    #[test]
    fn test_click_event_creation_minimal() {
        let event = ClickEvent::new(1, "xyz".to_string(), None, None, None);

        assert!(event.ip.is_none());
        assert!(event.user_agent.is_none());
        assert!(event.referer.is_none());
    }

    #[test]
    fn test_into_new_click() {
        let event = ClickEvent::new(
            9,
            "code1".to_string(),
            Some("1.1.1.1".to_string()),
            Some("Safari"),
            None,
        );

        let click: NewClick = event.into();

        assert_eq!(click.link_id, 9);
        assert_eq!(click.ip.as_deref(), Some("1.1.1.1"));
        assert_eq!(click.user_agent.as_deref(), Some("Safari"));
        assert!(click.referer.is_none());
    }
}
