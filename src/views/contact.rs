use askama::Template;
use askama_web::WebTemplate;

/// Email to the site owner announcing a new submission.
#[derive(Template)]
#[template(path = "emails/notification.html")]
pub struct NotificationEmail<'a> {
    pub site_name: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Auto-reply to the submitter echoing their message.
#[derive(Template)]
#[template(path = "emails/acknowledgment.html")]
pub struct AcknowledgmentEmail<'a> {
    pub site_name: &'a str,
    pub name: &'a str,
    pub message: &'a str,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact/page.html")]
pub struct ContactPage {
    pub site_name: String,
    pub endpoint: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_contains_submission() {
        let html = NotificationEmail {
            site_name: "Test Portfolio",
            name: "Ada",
            email: "ada@example.com",
            message: "Hi there\nsecond line",
        }
        .render()
        .unwrap();

        assert!(html.contains("Ada"));
        assert!(html.contains("ada@example.com"));
        assert!(html.contains("Hi there\nsecond line"));
        assert!(html.contains("Test Portfolio"));
    }

    #[test]
    fn acknowledgment_greets_submitter() {
        let html = AcknowledgmentEmail { site_name: "Test Portfolio", name: "Ada", message: "Hi there" }
            .render()
            .unwrap();

        assert!(html.contains("Hi <b>Ada</b>"));
        assert!(html.contains("Hi there"));
        assert!(html.contains("Thank you for contacting Test Portfolio!"));
    }

    #[test]
    fn user_content_is_escaped() {
        let html = NotificationEmail {
            site_name: "Test Portfolio",
            name: "<script>alert(1)</script>",
            email: "ada@example.com",
            message: "<img src=x onerror=alert(1)>",
        }
        .render()
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;img"));

        let html = AcknowledgmentEmail { site_name: "Test Portfolio", name: "<b>Eve</b>", message: "<i>x</i>" }
            .render()
            .unwrap();
        assert!(!html.contains("<b>Eve</b>"));
        assert!(!html.contains("<i>x</i>"));
    }

    #[test]
    fn page_has_form() {
        let html = ContactPage { site_name: "Test Portfolio".into(), endpoint: "/api/sendMail" }.render().unwrap();

        assert!(html.contains("<title>Contact | Test Portfolio</title>"));
        assert!(html.contains(r#"id="contact-form""#));
        for field in ["name", "email", "subject", "message"] {
            assert!(html.contains(&format!(r#"name="{field}""#)), "{field}");
        }
        assert!(html.contains(r#"type="email""#));
        assert!(html.contains("Sending..."));
    }
}
