use thiserror::Error;

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProviderType,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmailProviderType {
    Smtp,
    Mock,
    None,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email not configured: {0}")]
    NotConfigured(&'static str),
    #[error("smtp error: {0}")]
    Smtp(String),
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn from_env() -> Self {
        let provider = match env_string("EMAIL_PROVIDER").as_deref() {
            Some("smtp") => EmailProviderType::Smtp,
            Some("mock") => EmailProviderType::Mock,
            _ => EmailProviderType::None,
        };

        let config = EmailConfig {
            provider,
            smtp_host: env_string("SMTP_HOST"),
            smtp_port: env_u16("SMTP_PORT").unwrap_or(587),
            smtp_user: env_string("SMTP_USER"),
            smtp_password: env_string("SMTP_PASSWORD"),
            from_address: env_string("EMAIL_FROM").unwrap_or_else(|| "noreply@kupu.app".into()),
        };

        Self { config }
    }

    /// Provider that accepts every send without touching the network.
    pub fn mock() -> Self {
        Self {
            config: EmailConfig {
                provider: EmailProviderType::Mock,
                smtp_host: None,
                smtp_port: 587,
                smtp_user: None,
                smtp_password: None,
                from_address: "noreply@kupu.app".into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        match self.config.provider {
            EmailProviderType::Smtp => {
                self.config.smtp_host.is_some() && self.config.smtp_user.is_some()
            }
            EmailProviderType::Mock => true,
            EmailProviderType::None => false,
        }
    }

    pub fn provider_type(&self) -> &EmailProviderType {
        &self.config.provider
    }

    pub async fn send_verification_code(
        &self,
        to: &str,
        code: &str,
        ttl_minutes: i64,
    ) -> Result<(), EmailError> {
        let subject = "Your verification code";
        let body = format!(
            "Your verification code is: {code}\nIt expires in {ttl_minutes} minutes."
        );
        self.send_email(to, subject, &body).await
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        match self.config.provider {
            EmailProviderType::Smtp => self.send_via_smtp(to, subject, body).await,
            EmailProviderType::Mock => {
                // Dev parity with a real send: the code stays readable in
                // the logs instead of an inbox.
                tracing::info!(%to, %subject, body, "mock email provider, delivery skipped");
                Ok(())
            }
            EmailProviderType::None => Err(EmailError::NotConfigured("EMAIL_PROVIDER")),
        }
    }

    async fn send_via_smtp(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let host = self
            .config
            .smtp_host
            .as_deref()
            .ok_or(EmailError::NotConfigured("SMTP_HOST"))?;
        let user = self
            .config
            .smtp_user
            .as_deref()
            .ok_or(EmailError::NotConfigured("SMTP_USER"))?;
        let password = self
            .config
            .smtp_password
            .as_deref()
            .ok_or(EmailError::NotConfigured("SMTP_PASSWORD"))?;

        let from = &self.config.from_address;
        let port = self.config.smtp_port;

        tokio::task::spawn_blocking({
            let host = host.to_string();
            let user = user.to_string();
            let password = password.to_string();
            let from = from.to_string();
            let to = to.to_string();
            let subject = subject.to_string();
            let body = body.to_string();

            move || send_smtp_sync(&host, port, &user, &password, &from, &to, &subject, &body)
        })
        .await
        .map_err(|e| EmailError::Smtp(e.to_string()))?
    }
}

fn send_smtp_sync(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    from: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<(), EmailError> {
    use std::io::Write;
    use std::net::TcpStream;

    let addr = format!("{host}:{port}");
    let mut stream = TcpStream::connect(&addr).map_err(|e| EmailError::Smtp(e.to_string()))?;
    stream
        .set_read_timeout(Some(std::time::Duration::from_secs(30)))
        .ok();
    stream
        .set_write_timeout(Some(std::time::Duration::from_secs(30)))
        .ok();

    let mut buf = [0u8; 1024];

    macro_rules! read_response {
        () => {{
            use std::io::Read;
            let n = stream.read(&mut buf).map_err(|e| EmailError::Smtp(e.to_string()))?;
            String::from_utf8_lossy(&buf[..n]).to_string()
        }};
    }

    macro_rules! send_cmd {
        ($cmd:expr) => {{
            stream
                .write_all(format!("{}\r\n", $cmd).as_bytes())
                .map_err(|e| EmailError::Smtp(e.to_string()))?;
            read_response!()
        }};
    }

    let _ = read_response!();
    let _ = send_cmd!(format!("EHLO {host}"));
    let _ = send_cmd!("AUTH LOGIN");

    let user_b64 = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, user);
    let pass_b64 = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, password);

    let _ = send_cmd!(user_b64);
    let _ = send_cmd!(pass_b64);
    let _ = send_cmd!(format!("MAIL FROM:<{from}>"));
    let _ = send_cmd!(format!("RCPT TO:<{to}>"));
    let _ = send_cmd!("DATA");

    let message = format!(
        "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{body}\r\n."
    );
    let _ = send_cmd!(message);
    let _ = send_cmd!("QUIT");

    Ok(())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u16(key: &str) -> Option<u16> {
    env_string(key)?.parse().ok()
}
