use reqwest::Method;

use super::{segment, Ack, BackendClient, ListPage};
use crate::error::AppError;
use crate::models::{BloodBank, BloodRequest, Donor};
use crate::session::Session;

impl BackendClient {
    pub async fn list_donors(&self, session: &Session) -> Result<ListPage<Donor>, AppError> {
        self.fetch_list("/donors", session).await
    }

    pub async fn list_blood_banks(&self, session: &Session) -> Result<ListPage<BloodBank>, AppError> {
        self.fetch_list("/bloodbanks", session).await
    }

    pub async fn get_blood_bank(&self, session: &Session, id: &str) -> Result<BloodBank, AppError> {
        self.fetch_one(&format!("/bloodbanks/{}", segment(id)?), session).await
    }

    pub async fn list_blood_requests(&self, session: &Session) -> Result<ListPage<BloodRequest>, AppError> {
        self.fetch_list("/blood-requests", session).await
    }

    pub async fn create_blood_request(&self, session: &Session, request: &BloodRequest) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self
            .request(Method::POST, "/blood-requests", session)?
            .json(request);
        self.acknowledge(builder).await
    }
}
