//! HTML for dispatcher outcomes. Every dynamic string goes through [`escape`].

use cfgd::container::{Command, ConfigurationView, Outcome, RegistryEntry};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

const TITLE: &str = "Simple Configuration Server";

pub(crate) fn outcome(outcome: &Outcome) -> String {
    let mut body = String::new();
    match outcome {
        Outcome::Index { entries, commands } => {
            index(&mut body, entries);
            commands_form(&mut body, None, commands);
        },
        Outcome::ConfigView { config, commands } => {
            update_form(&mut body, config);
            commands_form(&mut body, Some(&config.id), commands);
        },
        Outcome::AddForm { config } => {
            update_form(&mut body, config);
            add_form(&mut body, config);
        },
        Outcome::UpdateFormRequested { config } => update_form(&mut body, config),
        Outcome::DeleteFormRequested { config } => delete_form(&mut body, config),
        Outcome::Stopped => body.push_str("<p>Server has now stopped.</p>"),
        Outcome::MutationAck { id, command, changed } => ack(&mut body, id, *command, changed),
        Outcome::ConfigNotFound { id: Some(id) } => {
            error(&mut body, &format!("Cannot find config with identifier '{id}'."));
        },
        Outcome::ConfigNotFound { id: None } => {
            error(&mut body, "Invalid command received. No config specified.");
        },
        Outcome::InvalidCommand { reason } => {
            error(&mut body, &format!("Invalid command received: {reason}."));
        },
        Outcome::UnknownCommand { token } => {
            error(&mut body, &format!("Unknown command '{token}'."));
        },
    }
    page(&body)
}

/// Page for failures outside the dispatcher.
pub(crate) fn failure(message: &str) -> String {
    let mut body = String::new();
    error(&mut body, message);
    page(&body)
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\" /><title>{TITLE}</title></head>\n\
         <body>\n{body}\n</body>\n</html>\n"
    )
}

fn index(html: &mut String, entries: &[RegistryEntry]) {
    html.push_str("<h2>Configurations</h2>\n<ul>\n");
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"/?config={}\">{}</a></li>\n",
            utf8_percent_encode(&entry.id, NON_ALPHANUMERIC),
            escape(&entry.display_name)
        ));
    }
    html.push_str("</ul>\n");
}

/// One GET button per command; `VIEW` is the plain link and never gets one.
fn commands_form(html: &mut String, config_id: Option<&str>, commands: &[Command]) {
    html.push_str("<h2>Server Commands</h2>\n");
    for command in commands.iter().filter(|c| **c != Command::View) {
        html.push_str("<form action=\"/\" method=\"get\">");
        if let Some(id) = config_id {
            hidden(html, "config", id);
        }
        hidden(html, "command", command.token());
        html.push_str(&format!("<input type=\"submit\" value=\"{}\" /></form>\n", command.token()));
    }
}

fn update_form(html: &mut String, config: &ConfigurationView) {
    html.push_str(&format!("<h3>Configuration Form for {}</h3>\n", escape(&config.display_name)));
    open_post_form(html, Command::Update, &config.id);
    for property in &config.properties {
        let key = escape(&property.key);
        html.push_str(&format!(
            "<br /><label>{key}</label><input type=\"text\" name=\"{key}\" value=\"{}\" />\n",
            escape(&property.value)
        ));
    }
    html.push_str("<br /><input type=\"submit\" value=\"Save\" /></form>\n");
}

fn add_form(html: &mut String, config: &ConfigurationView) {
    html.push_str("<h3>Add Setting</h3>\n");
    open_post_form(html, Command::Add, &config.id);
    html.push_str(
        "<input type=\"text\" name=\"key\" value=\"\" placeholder=\"key\" />\
         <input type=\"text\" name=\"value\" value=\"\" placeholder=\"value\" />\
         <input type=\"submit\" value=\"Add\" /></form>\n",
    );
}

fn delete_form(html: &mut String, config: &ConfigurationView) {
    html.push_str(&format!("<h3>Delete Settings from {}</h3>\n", escape(&config.display_name)));
    open_post_form(html, Command::Delete, &config.id);
    for property in &config.properties {
        let key = escape(&property.key);
        html.push_str(&format!(
            "<br /><label><input type=\"checkbox\" name=\"{key}\" value=\"on\" /> {key}</label>\n"
        ));
    }
    html.push_str("<br /><input type=\"submit\" value=\"Delete\" /></form>\n");
}

fn ack(html: &mut String, id: &str, command: Command, changed: &[String]) {
    html.push_str(if command == Command::Add {
        "<p>Configuration has been added!</p>\n"
    } else {
        "<p>Configuration has been updated!</p>\n"
    });
    if changed.is_empty() {
        html.push_str("<p>No properties changed.</p>\n");
    } else {
        html.push_str("<ul>\n");
        for key in changed {
            html.push_str(&format!("<li>{}</li>\n", escape(key)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str(&format!(
        "<a href=\"/?config={}\">Back</a>\n",
        utf8_percent_encode(id, NON_ALPHANUMERIC)
    ));
}

fn error(html: &mut String, message: &str) {
    html.push_str(&format!("<h2>Error</h2>\n<p>{}</p>\n", escape(message)));
}

fn open_post_form(html: &mut String, command: Command, config_id: &str) {
    html.push_str("<form action=\"/\" method=\"post\">\n");
    hidden(html, "command", command.token());
    hidden(html, "config_id", config_id);
    html.push('\n');
}

fn hidden(html: &mut String, name: &str, value: &str) {
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\" />",
        escape(name),
        escape(value)
    ));
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgd::container::Property;

    fn view() -> ConfigurationView {
        ConfigurationView {
            id: "db main".to_owned(),
            display_name: "<Database>".to_owned(),
            properties: vec![Property { key: "url".to_owned(), value: "a\"b".to_owned() }],
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }

    #[test]
    fn index_links_encode_identifiers() {
        let html = outcome(&Outcome::Index {
            entries: vec![RegistryEntry { id: "db main".to_owned(), display_name: "<DB>".to_owned() }],
            commands: vec![Command::Exit],
        });

        assert!(html.contains("<title>Simple Configuration Server</title>"));
        assert!(html.contains("href=\"/?config=db%20main\">&lt;DB&gt;</a>"));
        assert!(html.contains("name=\"command\" value=\"EXIT\""));
        assert!(!html.contains("name=\"config\""));
    }

    #[test]
    fn config_view_offers_update_form_and_commands() {
        let html = outcome(&Outcome::ConfigView { config: view(), commands: Command::actions() });

        assert!(html.contains("Configuration Form for &lt;Database&gt;"));
        assert!(html.contains("name=\"config_id\" value=\"db main\""));
        assert!(html.contains("name=\"url\" value=\"a&quot;b\""));
        for token in ["ADD", "UPDATE", "DELETE", "EXIT"] {
            assert!(html.contains(&format!("value=\"{token}\"")), "{token}");
        }
        assert!(!html.contains("value=\"VIEW\""));
    }

    #[test]
    fn delete_form_has_one_checkbox_per_property() {
        let html = outcome(&Outcome::DeleteFormRequested { config: view() });

        assert_eq!(html.matches("type=\"checkbox\"").count(), 1);
        assert!(html.contains("name=\"command\" value=\"DELETE\""));
    }

    #[test]
    fn add_form_posts_key_and_value() {
        let html = outcome(&Outcome::AddForm { config: view() });

        assert!(html.contains("name=\"command\" value=\"ADD\""));
        assert!(html.contains("name=\"key\""));
        assert!(html.contains("name=\"value\""));
    }

    #[test]
    fn errors_are_escaped() {
        let html = outcome(&Outcome::UnknownCommand { token: "<script>".to_owned() });
        assert!(html.contains("<h2>Error</h2>"));
        assert!(html.contains("Unknown command &#39;&lt;script&gt;&#39;."));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn empty_identifier_is_reported_as_not_found() {
        let html = outcome(&Outcome::ConfigNotFound { id: Some(String::new()) });
        assert!(html.contains("Cannot find config with identifier &#39;&#39;."));
        assert!(!html.contains("No config specified"));

        let html = outcome(&Outcome::ConfigNotFound { id: None });
        assert!(html.contains("No config specified"));
    }

    #[test]
    fn ack_lists_changed_keys() {
        let html = outcome(&Outcome::MutationAck {
            id: "db".to_owned(),
            command: Command::Add,
            changed: vec!["pool".to_owned()],
        });
        assert!(html.contains("Configuration has been added!"));
        assert!(html.contains("<li>pool</li>"));
        assert!(html.contains("href=\"/?config=db\">Back"));

        let html = outcome(&Outcome::MutationAck {
            id: "db".to_owned(),
            command: Command::Delete,
            changed: Vec::new(),
        });
        assert!(html.contains("No properties changed."));
    }

    #[test]
    fn stopped_page() {
        assert!(outcome(&Outcome::Stopped).contains("Server has now stopped."));
    }
}
