use quire_core::User;

use super::HttpGateway;
use crate::error::ApiResult;

impl HttpGateway {
    /// Look users up by email fragment
    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        let url = self.endpoint(&["user", "search"])?;
        let request = self.client.get(url).query(&[("query", query)]);
        self.send(request).await?.list(&["users"])
    }
}
