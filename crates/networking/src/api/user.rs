//! User-related API operations

use crate::PanelClient;
use panel_core::{Result, UserInfo};

/// Fetch the logged-in user
pub async fn fetch_user(client: &PanelClient) -> Result<UserInfo> {
    client.get_user().await
}

/// Whether the logged-in user may open the admin pages
pub async fn is_admin(client: &PanelClient) -> Result<bool> {
    client.get_admin_status().await
}

/// Current coin balance
pub async fn coin_balance(client: &PanelClient) -> Result<f64> {
    client.get_coins().await
}

/// End the session
pub async fn logout(client: &PanelClient) -> Result<()> {
    client.logout().await
}
