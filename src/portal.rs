use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::{header::ACCEPT, Client};

use crate::clock::Mark;

/// 指定した日の打刻を取得するためのtrait。
#[cfg_attr(test, mockall::automock)]
pub trait MarksRepository {
    /// 指定された日付の打刻を時系列順に取得する。
    ///
    /// # Arguments
    ///
    /// * `date` - 取得する打刻の日付
    async fn read_marks(&self, date: &NaiveDate) -> Result<Vec<Mark>>;
}

/// 勤怠ポータルに接続するための認証情報。
#[derive(Clone, Debug)]
pub struct PortalCredentials {
    pub url: String,
    pub user: String,
    pub password: String,
    pub company: String,
}

/// 勤怠ポータルと通信するためのクライアント。
///
/// # Examples
///
/// ```
/// let client = PortalClient::new(credentials);
/// let marks = client.read_marks(&date).await.unwrap();
/// ```
pub struct PortalClient {
    client: Client,
    credentials: PortalCredentials,
}

impl PortalClient {
    /// 新しい`PortalClient`を返す。
    pub fn new(credentials: PortalCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }
}

impl MarksRepository for PortalClient {
    /// 勤怠ポータルから打刻を取得する。
    ///
    /// レスポンスの時刻は`Mark`として検証し、不正な時刻が含まれる場合はエラーを返す。
    async fn read_marks(&self, date: &NaiveDate) -> Result<Vec<Mark>> {
        let url = format!(
            "{}/companies/{}/marks",
            self.credentials.url.trim_end_matches('/'),
            self.credentials.company
        );
        debug!("Requesting marks from {} for {}", url, date);

        let marks = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .query(&[("date", date.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to portal at {}", url))?
            .error_for_status()
            .context("Request returned an error status")?
            .json::<Vec<Mark>>()
            .await
            .context("Failed to deserialize marks")?;
        info!("length of marks: {}", marks.len());

        Ok(marks)
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;

    use super::{MarksRepository, PortalClient, PortalCredentials};
    use crate::clock::Mark;

    fn credentials(url: String) -> PortalCredentials {
        PortalCredentials {
            url,
            user: "321".to_string(),
            password: "123".to_string(),
            company: "a22".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 9, 23).unwrap()
    }

    #[tokio::test]
    async fn test_read_marks() {
        let mut server = mockito::Server::new_async().await;
        let authorization = format!("Basic {}", STANDARD.encode("321:123"));
        let mock = server
            .mock("GET", "/companies/a22/marks")
            .match_query(Matcher::UrlEncoded(
                "date".to_string(),
                "2020-09-23".to_string(),
            ))
            .match_header("authorization", authorization.as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([{"clock": "09:00"}, {"clock": "1200"}, {"clock": "13:00"}]).to_string())
            .create_async()
            .await;

        let client = PortalClient::new(credentials(server.url()));
        let marks = client.read_marks(&date()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            marks,
            vec![
                Mark::parse("09:00").unwrap(),
                Mark::parse("12:00").unwrap(),
                Mark::parse("13:00").unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_marks_trailing_slash_in_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/companies/a22/marks")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = PortalClient::new(credentials(format!("{}/", server.url())));
        let marks = client.read_marks(&date()).await.unwrap();

        mock.assert_async().await;
        assert!(marks.is_empty());
    }

    #[tokio::test]
    async fn test_read_marks_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/companies/a22/marks")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let client = PortalClient::new(credentials(server.url()));

        assert!(client.read_marks(&date()).await.is_err());
    }

    #[tokio::test]
    async fn test_read_marks_invalid_clock() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/companies/a22/marks")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!([{"clock": "09:00"}, {"clock": "99:99"}]).to_string())
            .create_async()
            .await;

        let client = PortalClient::new(credentials(server.url()));

        assert!(client.read_marks(&date()).await.is_err());
    }
}
