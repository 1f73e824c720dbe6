use actix_web::HttpResponse;

use crate::errors::BoardError;

pub type Response = Result<HttpResponse, BoardError>;
