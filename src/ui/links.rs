use crate::model::Environment;
use crate::plugin::PluginId;
use crate::request::ToggleKeys;
use crate::ui::escape_html;

/// Per-plugin action that tags or untags it for the current environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleLink {
    pub plugin: PluginId,
    /// Request parameter carrying the plugin id.
    pub key: &'static str,
    pub label: String,
    pub href: String,
}

impl ToggleLink {
    /// `tagged` is whether `plugin` is already in `env`'s tag set.
    pub fn build(env: Environment, plugin: &PluginId, tagged: bool, admin_url: &str) -> Self {
        let keys = ToggleKeys::for_environment(env);
        let (key, label) = if tagged {
            (keys.remove, format!("No more {env} only"))
        } else {
            (keys.add, format!("Use for {env} only"))
        };

        let query = serde_urlencoded::to_string(&[(key, plugin.as_str())])
            .expect("string pairs always encode");
        let href = format!("{}/plugins.php?{query}", admin_url.trim_end_matches('/'));

        Self {
            plugin: plugin.clone(),
            key,
            label,
            href,
        }
    }

    /// Element id derived from the plugin id.
    pub fn anchor_id(&self) -> String {
        slug(self.plugin.as_str())
    }

    pub fn to_html(&self) -> String {
        format!(
            r#"<a id="{}" href="{}">{}</a>"#,
            escape_html(&self.anchor_id()),
            escape_html(&self.href),
            escape_html(&self.label)
        )
    }
}

fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_plugin_gets_add_key() {
        let link = ToggleLink::build(
            Environment::Staging,
            &"x".into(),
            false,
            "http://example.test/wp-admin/",
        );
        assert_eq!(link.key, "stage_only");
        assert_eq!(link.label, "Use for staging only");
        assert_eq!(link.href, "http://example.test/wp-admin/plugins.php?stage_only=x");
    }

    #[test]
    fn tagged_plugin_gets_remove_key() {
        let link = ToggleLink::build(Environment::Staging, &"x".into(), true, "http://h/wp-admin");
        assert_eq!(link.key, "notstage_only");
        assert_eq!(link.label, "No more staging only");
    }

    #[test]
    fn html_encodes_id_and_slug() {
        let link = ToggleLink::build(
            Environment::Development,
            &"Hello Dolly/hello.php".into(),
            false,
            "http://h/wp-admin",
        );
        assert_eq!(link.anchor_id(), "hello-dolly-hello-php");
        assert_eq!(
            link.to_html(),
            r#"<a id="hello-dolly-hello-php" href="http://h/wp-admin/plugins.php?dev_only=Hello+Dolly%2Fhello.php">Use for development only</a>"#
        );
    }
}
