//! Subject, HTML and plain-text bodies for every outbound email.

use chrono::{DateTime, Utc};
use htmlescape::encode_minimal as escape;

use crate::domain::{ContactSubmission, NewsletterSubscriber};
use crate::notifier::Notification;

const BRAND: &str = "ARCHIKMOR";
const TAGLINE: &str = "Timeless Harmony";
const SIGN_OFF: &str = "We look forward to helping you create timeless spaces with wood, wisdom, and harmony.";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
    /// Overrides the configured sender display name.
    pub from_name: Option<String>,
}

/// Renders [`Notification`]s into email bodies.
#[derive(Debug, Clone)]
pub struct EmailRenderer {
    website_url: String,
    studio_email: String,
}

impl EmailRenderer {
    pub fn new(website_url: &str, studio_email: &str) -> Self {
        Self {
            website_url: website_url.trim_end_matches('/').to_string(),
            studio_email: studio_email.to_string(),
        }
    }

    pub fn render(&self, notification: &Notification<'_>) -> RenderedEmail {
        match notification {
            Notification::ContactNotification(s) => self.contact_notification(s),
            Notification::ContactConfirmation(s) => self.contact_confirmation(s),
            Notification::ContactFollowup(s) => self.contact_followup(s),
            Notification::NewsletterNotification(s) => self.newsletter_notification(s),
            Notification::NewsletterConfirmation(s) => self.newsletter_confirmation(s),
            Notification::NewsletterDay3(s) => self.newsletter_day3(s),
            Notification::NewsletterDay7(s) => self.newsletter_day7(s),
            Notification::CatalogueDelivery { .. } => self.catalogue_delivery(),
        }
    }

    fn contact_notification(&self, submission: &ContactSubmission) -> RenderedEmail {
        let project = submission.project.as_deref().unwrap_or("Not specified");
        let received = format_timestamp(&submission.received_at);
        let html = layout(
            "New Contact Form Submission",
            &received,
            &format!(
                r#"{name}{email}{project}{message}
                <p style="text-align: center;"><a href="mailto:{reply}?subject=Re: Your inquiry to {BRAND}">Reply to {name_raw}</a></p>"#,
                name = field("Name", &escape(&submission.name)),
                email = field(
                    "Email",
                    &format!(
                        r#"<a href="mailto:{0}">{0}</a>"#,
                        escape(submission.email.as_ref())
                    )
                ),
                project = field("Project Type", &escape(project)),
                message = field("Message", &escape(&submission.message).replace('\n', "<br>")),
                reply = escape(submission.email.as_ref()),
                name_raw = escape(&submission.name),
            ),
            &format!(
                r#"<p>This email was sent from the contact form on your website.</p><p><a href="{0}">View Website</a></p>"#,
                self.website_url
            ),
        );
        let text = format!(
            "New Contact Form Submission\n{received}\n\nName: {}\nEmail: {}\nProject Type: {project}\n\nMessage:\n{}\n\n---\nReply to: {}\nView website: {}\n\n{BRAND} - {TAGLINE}",
            submission.name, submission.email, submission.message, submission.email, self.website_url,
        );
        RenderedEmail {
            subject: format!("New Contact Form Submission from {}", submission.name),
            html,
            text,
            from_name: Some(format!("{BRAND} Contact Form")),
        }
    }

    fn contact_confirmation(&self, submission: &ContactSubmission) -> RenderedEmail {
        let highlight = ProjectHighlight::for_project(submission.project.as_deref());
        let response_time = highlight.map_or("24-48 hours", |h| h.response_time);
        let highlight_html = highlight
            .map(|h| {
                format!(
                    r#"<div class="highlight"><p><strong>{}:</strong> {}</p></div>"#,
                    h.title, h.description
                )
            })
            .unwrap_or_default();
        let highlight_text = highlight
            .map(|h| format!("{}: {}\n\n", h.title, h.description))
            .unwrap_or_default();

        let html = layout(
            BRAND,
            TAGLINE,
            &format!(
                r#"<p>Dear {name},</p>
                <p>Thank you for reaching out to {BRAND}! We have received your contact form submission and truly appreciate your interest in our design services.</p>
                <p>Our team will review your message and get back to you as soon as possible, typically within <strong>{response_time}</strong>.</p>
                {highlight_html}
                <p style="text-align: center;"><a href="{website}/#catalogue">View Our Catalog</a></p>
                <p>In the meantime, feel free to connect with us at <a href="mailto:{studio}">{studio}</a>.</p>
                <p>{SIGN_OFF}</p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                name = escape(&submission.name),
                website = self.website_url,
                studio = escape(&self.studio_email),
            ),
            &format!(
                "<p>This email was sent to {}</p>",
                escape(submission.email.as_ref())
            ),
        );
        let text = format!(
            "Dear {},\n\nThank you for reaching out to {BRAND}! We have received your contact form submission and truly appreciate your interest in our design services.\n\nOur team will review your message and get back to you as soon as possible, typically within {response_time}.\n\n{highlight_text}View our catalog: {}/#catalogue\n\nIn the meantime, feel free to connect with us:\nEmail: {}\n\n{SIGN_OFF}\n\nBest regards,\nThe {BRAND} Team\n\n---\nThis email was sent to {}",
            submission.name, self.website_url, self.studio_email, submission.email,
        );
        RenderedEmail {
            subject: format!("Thank You for Contacting {BRAND}"),
            html,
            text,
            from_name: None,
        }
    }

    fn contact_followup(&self, submission: &ContactSubmission) -> RenderedEmail {
        let project = submission
            .project
            .as_deref()
            .map(|p| format!(" about your {} project", p.to_lowercase()))
            .unwrap_or_default();
        let html = layout(
            BRAND,
            TAGLINE,
            &format!(
                r#"<p>Dear {name},</p>
                <p>A few days ago you contacted us{project}. We wanted to make sure you received everything you needed.</p>
                <p>If you would like to schedule a consultation or have more details to share, simply reply to this email.</p>
                <p style="text-align: center;"><a href="{website}/#contact">Schedule a Consultation</a></p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                name = escape(&submission.name),
                project = escape(&project),
                website = self.website_url,
            ),
            "",
        );
        let text = format!(
            "Dear {},\n\nA few days ago you contacted us{project}. We wanted to make sure you received everything you needed.\n\nIf you would like to schedule a consultation or have more details to share, simply reply to this email.\n\nSchedule a consultation: {}/#contact\n\nBest regards,\nThe {BRAND} Team",
            submission.name, self.website_url,
        );
        RenderedEmail {
            subject: format!("Following Up on Your {BRAND} Inquiry"),
            html,
            text,
            from_name: None,
        }
    }

    fn newsletter_notification(&self, subscriber: &NewsletterSubscriber) -> RenderedEmail {
        let subscribed = format_timestamp(&subscriber.subscribed_at);
        let name = subscriber.name.as_deref().unwrap_or("Not provided");
        let html = layout(
            "New Newsletter Subscription",
            &subscribed,
            &format!(
                "{}{}",
                field("Name", &escape(name)),
                field(
                    "Email",
                    &format!(
                        r#"<a href="mailto:{0}">{0}</a>"#,
                        escape(subscriber.email.as_ref())
                    )
                ),
            ),
            &format!(r#"<p><a href="{0}">View Website</a></p>"#, self.website_url),
        );
        let text = format!(
            "New Newsletter Subscription\n{subscribed}\n\nName: {name}\nEmail: {}\n\n{BRAND} - {TAGLINE}",
            subscriber.email,
        );
        RenderedEmail {
            subject: format!(
                "New Newsletter Subscription: {}",
                subscriber.name.as_deref().unwrap_or(subscriber.email.as_ref())
            ),
            html,
            text,
            from_name: Some(format!("{BRAND} Newsletter")),
        }
    }

    fn newsletter_confirmation(&self, subscriber: &NewsletterSubscriber) -> RenderedEmail {
        let html = layout(
            BRAND,
            TAGLINE,
            &format!(
                r#"<p>Dear {name},</p>
                <p>Thank you for subscribing to the {BRAND} newsletter! We're thrilled to have you join our community of design enthusiasts.</p>
                <p>You'll now receive exclusive updates about our latest collections, project showcases, special offers, and design tips.</p>
                <p style="text-align: center;"><a href="{website}/#catalogue">Download your free catalog</a></p>
                <p style="text-align: center;"><a href="{website}/#preview">Explore our collections</a></p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                name = escape(subscriber.display_name()),
                website = self.website_url,
            ),
            UNSUBSCRIBE_HTML,
        );
        let text = format!(
            "Dear {},\n\nThank you for subscribing to the {BRAND} newsletter! We're thrilled to have you join our community of design enthusiasts.\n\nYou'll now receive exclusive updates about our latest collections, project showcases, special offers, and design tips.\n\nDownload your free catalog: {website}/#catalogue\nExplore our collections: {website}/#preview\n\nBest regards,\nThe {BRAND} Team\n\n---\n{UNSUBSCRIBE_TEXT}",
            subscriber.display_name(),
            website = self.website_url,
        );
        RenderedEmail {
            subject: format!("Welcome to {BRAND} Newsletter!"),
            html,
            text,
            from_name: None,
        }
    }

    fn newsletter_day3(&self, subscriber: &NewsletterSubscriber) -> RenderedEmail {
        let html = layout(
            BRAND,
            "Signature Collections",
            &format!(
                r#"<p>Dear {name},</p>
                <p>Every {BRAND} piece starts with the wood itself. This week we invite you to discover the collections our clients love most: living rooms, bedrooms, kitchens and workspaces shaped by natural materials.</p>
                <p style="text-align: center;"><a href="{website}/#preview">Discover the Collections</a></p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                name = escape(subscriber.display_name()),
                website = self.website_url,
            ),
            UNSUBSCRIBE_HTML,
        );
        let text = format!(
            "Dear {},\n\nEvery {BRAND} piece starts with the wood itself. This week we invite you to discover the collections our clients love most: living rooms, bedrooms, kitchens and workspaces shaped by natural materials.\n\nDiscover the collections: {}/#preview\n\nBest regards,\nThe {BRAND} Team\n\n---\n{UNSUBSCRIBE_TEXT}",
            subscriber.display_name(),
            self.website_url,
        );
        RenderedEmail {
            subject: format!("Discover Our Signature Collections - {BRAND}"),
            html,
            text,
            from_name: None,
        }
    }

    fn newsletter_day7(&self, subscriber: &NewsletterSubscriber) -> RenderedEmail {
        let html = layout(
            BRAND,
            "Design Tips",
            &format!(
                r#"<p>Dear {name},</p>
                <p>Here are three ideas our designers return to again and again: let natural light guide the layout, pair warm woods with calm neutral tones, and choose fewer pieces of higher quality.</p>
                <p>As a thank you for subscribing, book a consultation this month and we will prepare a personalised material selection for your project.</p>
                <p style="text-align: center;"><a href="{website}/#contact">Book a Consultation</a></p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                name = escape(subscriber.display_name()),
                website = self.website_url,
            ),
            UNSUBSCRIBE_HTML,
        );
        let text = format!(
            "Dear {},\n\nHere are three ideas our designers return to again and again: let natural light guide the layout, pair warm woods with calm neutral tones, and choose fewer pieces of higher quality.\n\nAs a thank you for subscribing, book a consultation this month and we will prepare a personalised material selection for your project.\n\nBook a consultation: {}/#contact\n\nBest regards,\nThe {BRAND} Team\n\n---\n{UNSUBSCRIBE_TEXT}",
            subscriber.display_name(),
            self.website_url,
        );
        RenderedEmail {
            subject: format!("Design Tips & Exclusive Offer - {BRAND}"),
            html,
            text,
            from_name: None,
        }
    }

    fn catalogue_delivery(&self) -> RenderedEmail {
        let html = layout(
            BRAND,
            TAGLINE,
            &format!(
                r#"<p>Dear Valued Client,</p>
                <p>Thank you for your interest in {BRAND}. Please find our 2026 catalogue attached to this email.</p>
                <p>Have questions or need assistance? Write to us at <a href="mailto:{studio}">{studio}</a> or visit <a href="{website}">our website</a>.</p>
                <p>{SIGN_OFF}</p>
                <p>Best regards,<br><strong>The {BRAND} Team</strong></p>"#,
                studio = escape(&self.studio_email),
                website = self.website_url,
            ),
            "",
        );
        let text = format!(
            "Dear Valued Client,\n\nThank you for your interest in {BRAND}. Please find our 2026 catalogue attached to this email.\n\nHave questions or need assistance?\nEmail: {}\nWebsite: {}\n\n{SIGN_OFF}\n\nBest regards,\nThe {BRAND} Team",
            self.studio_email, self.website_url,
        );
        RenderedEmail {
            subject: format!("Your {BRAND} Catalogue 2026"),
            html,
            text,
            from_name: None,
        }
    }
}

const UNSUBSCRIBE_HTML: &str = r#"<p><small>You can unsubscribe at any time by replying to this email with "UNSUBSCRIBE" in the subject line.</small></p>"#;
const UNSUBSCRIBE_TEXT: &str =
    r#"You can unsubscribe at any time by replying to this email with "UNSUBSCRIBE" in the subject line."#;

/// Extra paragraph and response time offered for known project types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectHighlight {
    pub title: &'static str,
    pub description: &'static str,
    pub response_time: &'static str,
}

impl ProjectHighlight {
    pub fn for_project(project: Option<&str>) -> Option<Self> {
        let project = project?.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| project.contains(k));
        // "bedroom" contains "room", so it has to be checked first.
        let highlight = if matches(&["bedroom"]) {
            Self {
                title: "Bedroom Collections",
                description: "Discover bedroom designs that combine comfort with sophisticated wood craftsmanship.",
                response_time: "24-48 hours",
            }
        } else if matches(&["living", "room"]) {
            Self {
                title: "Living Room Collections",
                description: "Explore our curated living room designs featuring custom wood panels, elegant furniture, and timeless architectural elements.",
                response_time: "24-48 hours",
            }
        } else if matches(&["kitchen"]) {
            Self {
                title: "Kitchen Collections",
                description: "Browse kitchen designs featuring custom woodwork, cabinetry, and warm architectural elements.",
                response_time: "48-72 hours",
            }
        } else if matches(&["workspace", "office"]) {
            Self {
                title: "Workspace Collections",
                description: "View workspace solutions designed to inspire productivity with elegant wood furniture and thoughtful space planning.",
                response_time: "24-48 hours",
            }
        } else if matches(&["architectural", "wood"]) {
            Self {
                title: "Architectural Wood Collections",
                description: "Explore bespoke architectural woodwork including custom panels, beams, and structural elements.",
                response_time: "48-72 hours",
            }
        } else {
            return None;
        };
        Some(highlight)
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%B %-d, %Y at %-I:%M %p UTC").to_string()
}

fn field(label: &str, value_html: &str) -> String {
    format!(
        r#"<div class="field"><div class="label">{label}</div><div class="value">{value_html}</div></div>"#
    )
}

fn layout(heading: &str, subheading: &str, content: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>
body {{ font-family: 'Montserrat', Arial, sans-serif; line-height: 1.6; color: #2D2D2D; margin: 0; background-color: #F5F3EE; }}
.container {{ max-width: 600px; margin: 0 auto; background-color: #ffffff; }}
.header {{ background: linear-gradient(135deg, #7A7A4F 0%, #B8C2A8 100%); color: #F5F3EE; padding: 30px 20px; text-align: center; }}
.content {{ background: #F5F3EE; padding: 30px; }}
.label {{ font-weight: 600; color: #7A7A4F; text-transform: uppercase; font-size: 14px; }}
.value, .highlight {{ padding: 15px; background: white; border-left: 4px solid #D9C9A3; margin-bottom: 20px; }}
.footer {{ text-align: center; padding: 20px; color: #7A7A4F; font-size: 12px; background: white; }}
</style>
</head>
<body>
<div class="container">
<div class="header"><h1>{heading}</h1><p>{subheading}</p></div>
<div class="content">{content}</div>
<div class="footer"><p>&copy; {BRAND}. Crafting timeless spaces with wood, wisdom, and harmony.</p>{footer}</div>
</div>
</body>
</html>"#
    )
}
