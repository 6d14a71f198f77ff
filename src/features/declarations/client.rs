use crate::{
    features::declarations::types::{Declaration, DeclarationResponse, NewDeclaration},
    portal::{ApiClient, ApiError},
};
use tracing::instrument;

/// Declarations of the signed-in user.
#[instrument(skip(api))]
pub async fn list_declarations(api: &ApiClient) -> Result<Vec<Declaration>, ApiError> {
    api.get_json("/declarations").await
}

#[instrument(skip(api, request), fields(fiscal_year = request.fiscal_year))]
pub async fn create_declaration(
    api: &ApiClient,
    request: &NewDeclaration,
) -> Result<DeclarationResponse, ApiError> {
    api.post_json("/declarations", request).await
}
