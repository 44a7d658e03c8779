use crate::app_data::AppData;
use crate::notifications::OutgoingMail;

/// Send one message through the configured transport and report the outcome
pub async fn send_test_email(
    app_data: &AppData,
    to: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = &app_data.mail_transport;
    println!("Sending test email to {} via {} transport...", to, transport.name());

    let mail = OutgoingMail {
        subject: "IT Support System - Email Test".to_string(),
        html_body: format!(
            "<html><body><h2>Email Test</h2><p>If you can read this, outbound email from \
             the helpdesk at {} works.</p></body></html>",
            app_data.settings.site_url()
        ),
        from: app_data.settings.default_from_email().to_string(),
        to: vec![to.to_string()],
    };

    match transport.send(&mail).await {
        Ok(()) => {
            println!("✓ Test email sent");
            Ok(())
        }
        Err(e) => {
            println!("❌ Test email failed: {}", e);
            Err(e.into())
        }
    }
}
