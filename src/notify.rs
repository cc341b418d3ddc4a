//! Desktop notification sinks.
//!
//! A [`Notification`] carries everything a platform notifier may display.
//! Only the message is required. The link may be a URL, which is opened
//! when the notification is clicked, or an application bundle identifier
//! (`com.example.App`), which is activated instead.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::format::FormattedNotification;

/// Built-in notification sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    Default,
    Basso,
    Blow,
    Bottle,
    Frog,
    Funk,
    Glass,
    Hero,
    Morse,
    Ping,
    Pop,
    Purr,
    Sosumi,
    Tink,
}

impl Sound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Basso => "Basso",
            Self::Blow => "Blow",
            Self::Bottle => "Bottle",
            Self::Frog => "Frog",
            Self::Funk => "Funk",
            Self::Glass => "Glass",
            Self::Hero => "Hero",
            Self::Morse => "Morse",
            Self::Ping => "Ping",
            Self::Pop => "Pop",
            Self::Purr => "Purr",
            Self::Sosumi => "Sosumi",
            Self::Tink => "Tink",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub sound: Option<Sound>,
    pub link: Option<String>,
    pub sender: Option<String>,
    pub group: Option<String>,
    pub app_icon: Option<PathBuf>,
    pub content_image: Option<PathBuf>,
}

/// What a notification's link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Url(String),
    Bundle(String),
}

fn is_bundle_id(s: &str) -> bool {
    s.to_ascii_lowercase().starts_with("com.")
}

impl LinkTarget {
    /// Classify a link. Returns `None` for empty strings and for anything that
    /// is neither a bundle identifier nor an absolute URL.
    pub fn parse(link: &str) -> Option<Self> {
        if link.is_empty() {
            None
        } else if is_bundle_id(link) {
            Some(Self::Bundle(link.to_string()))
        } else if reqwest::Url::parse(link).is_ok() {
            Some(Self::Url(link.to_string()))
        } else {
            None
        }
    }
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_sound(mut self, sound: Sound) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_app_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.app_icon = Some(path.into());
        self
    }

    pub fn with_content_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.content_image = Some(path.into());
        self
    }

    pub fn link_target(&self) -> Option<LinkTarget> {
        self.link.as_deref().and_then(LinkTarget::parse)
    }

    /// Command-line arguments for `terminal-notifier`.
    pub fn to_args(&self) -> Result<Vec<String>, DispatchError> {
        if self.message.is_empty() {
            return Err(DispatchError::EmptyMessage);
        }

        let mut args = vec!["-message".to_string(), self.message.clone()];
        let mut push = |flag: &str, value: String| {
            args.push(flag.to_string());
            args.push(value);
        };

        for (flag, value) in [
            ("-title", &self.title),
            ("-subtitle", &self.subtitle),
            ("-group", &self.group),
        ] {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                push(flag, value.clone());
            }
        }

        if let Some(sound) = self.sound {
            push("-sound", sound.as_str().to_string());
        }
        if let Some(icon) = &self.app_icon {
            push("-appIcon", absolute_image(icon)?);
        }
        if let Some(image) = &self.content_image {
            push("-contentImage", absolute_image(image)?);
        }

        match self.link_target() {
            Some(LinkTarget::Url(url)) => push("-open", url),
            Some(LinkTarget::Bundle(id)) => push("-activate", id),
            None => {}
        }

        if let Some(sender) = self.sender.as_deref().filter(|s| is_bundle_id(s)) {
            push("-sender", sender.to_string());
        }

        Ok(args)
    }
}

impl From<FormattedNotification> for Notification {
    fn from(formatted: FormattedNotification) -> Self {
        Notification::new(formatted.message)
            .with_title(formatted.title)
            .with_link(formatted.link)
    }
}

fn absolute_image(path: &Path) -> Result<String, DispatchError> {
    std::path::absolute(path)
        .map(|p| p.display().to_string())
        .map_err(|source| DispatchError::ImagePath {
            path: path.display().to_string(),
            source,
        })
}

/// Somewhere notifications can be shown.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError>;
}

/// Shows notifications through the `terminal-notifier` command-line tool.
#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    program: PathBuf,
}

impl TerminalNotifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new("terminal-notifier")
    }
}

#[async_trait]
impl NotificationSink for TerminalNotifier {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        let args = notification.to_args()?;
        debug!(program = %self.program.display(), ?args, "running notifier");

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await?;

        if !output.status.success() {
            return Err(DispatchError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Writes notifications to the log. Used on platforms without a notifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        if notification.message.is_empty() {
            return Err(DispatchError::EmptyMessage);
        }
        info!(
            title = notification.title.as_deref().unwrap_or(""),
            link = notification.link.as_deref().unwrap_or(""),
            "{}",
            notification.message
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only() {
        let args = Notification::new("Hello").to_args().unwrap();
        assert_eq!(args, vec!["-message", "Hello"]);
    }

    #[test]
    fn empty_message_is_rejected() {
        let err = Notification::new("").with_title("t").to_args().unwrap_err();
        assert!(matches!(err, DispatchError::EmptyMessage));
    }

    #[test]
    fn url_link_opens() {
        let args = Notification::new("pushed")
            .with_title("octocat")
            .with_link("http://github.com/a/b")
            .to_args()
            .unwrap();
        assert_eq!(
            args,
            vec![
                "-message",
                "pushed",
                "-title",
                "octocat",
                "-open",
                "http://github.com/a/b"
            ]
        );
    }

    #[test]
    fn bundle_link_activates() {
        let n = Notification::new("hi").with_link("com.apple.Safari");
        assert_eq!(
            n.link_target(),
            Some(LinkTarget::Bundle("com.apple.Safari".into()))
        );
        let args = n.to_args().unwrap();
        assert_eq!(args[2..], ["-activate", "com.apple.Safari"]);
    }

    #[test]
    fn unparseable_link_is_ignored() {
        assert_eq!(LinkTarget::parse(""), None);
        assert_eq!(LinkTarget::parse("not a url"), None);
        let args = Notification::new("hi").with_link("::").to_args().unwrap();
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn optional_fields_in_order() {
        let args = Notification::new("m")
            .with_subtitle("s")
            .with_group("github-1")
            .with_sound(Sound::Ping)
            .with_sender("com.apple.Terminal")
            .to_args()
            .unwrap();
        assert_eq!(
            args,
            vec![
                "-message",
                "m",
                "-subtitle",
                "s",
                "-group",
                "github-1",
                "-sound",
                "Ping",
                "-sender",
                "com.apple.Terminal"
            ]
        );
    }

    #[test]
    fn sender_must_be_a_bundle_id() {
        let args = Notification::new("m").with_sender("terminal").to_args().unwrap();
        assert!(!args.contains(&"-sender".to_string()));
    }

    #[test]
    fn image_paths_are_made_absolute() {
        let args = Notification::new("m")
            .with_app_icon("icon.png")
            .with_content_image("/tmp/image.png")
            .to_args()
            .unwrap();
        assert_eq!(args[2], "-appIcon");
        assert!(Path::new(&args[3]).is_absolute());
        assert!(args[3].ends_with("icon.png"));
        assert_eq!(args[4..], ["-contentImage", "/tmp/image.png"]);
    }

    #[test]
    fn formatted_notification_converts() {
        let n = Notification::from(FormattedNotification {
            message: "starred a/b".into(),
            link: "http://github.com/a/b".into(),
            title: "octocat".into(),
        });
        assert_eq!(n.message, "starred a/b");
        assert_eq!(n.title.as_deref(), Some("octocat"));
        assert_eq!(
            n.link_target(),
            Some(LinkTarget::Url("http://github.com/a/b".into()))
        );
    }

    #[tokio::test]
    async fn log_notifier_rejects_empty_message() {
        assert!(LogNotifier.dispatch(&Notification::new("")).await.is_err());
        assert!(LogNotifier.dispatch(&Notification::new("ok")).await.is_ok());
    }

    #[tokio::test]
    async fn missing_notifier_binary_is_a_spawn_error() {
        let sink = TerminalNotifier::new("/nonexistent/terminal-notifier");
        let err = sink.dispatch(&Notification::new("hi")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Spawn(_)));
    }
}
