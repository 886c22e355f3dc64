use tracing::info;

use super::{ApiClient, ApiRequest};
use crate::{
    cache::QueryKey,
    error::ClientError,
    models::{NewRoom, Room},
};

impl ApiClient {
    pub async fn rooms(&self) -> Result<Vec<Room>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Rooms, || async move {
                let rooms = self.transport.fetch::<Vec<Room>>(ApiRequest::get("/rooms"), None).await?;
                Ok(rooms.unwrap_or_default())
            })
            .await
    }

    pub async fn create_room(&self, room: &NewRoom) -> Result<Option<Room>, ClientError> {
        self.require_admin()?;
        let created = self
            .auth
            .fetch_with_auth::<Room>(ApiRequest::post("/rooms").json(room)?)
            .await?;
        self.cache.invalidate(&QueryKey::Rooms).await;
        info!("Room {} created", room.name);
        Ok(created)
    }
}
