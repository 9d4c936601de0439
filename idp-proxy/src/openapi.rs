use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const RELAY_TAG: &str = "OAuth Relay API";
pub(crate) const ADMIN_TAG: &str = "Admin API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = RELAY_TAG, description = "Authorization code flow relayed to the identity provider"),
        (name = ADMIN_TAG, description = "Hierarchy configuration management"),
    ),
    paths(
        crate::api::health::health_check,
        crate::api::health::ready_check,
        crate::api::authenticate::authenticate,
        crate::api::callback::callback,
        crate::api::token::token,
        crate::api::userinfo::userinfo,
        crate::api::admin::get_hierarchy_config,
        crate::api::admin::put_hierarchy_config,
    ),
    components(schemas(
        crate::errors::ErrorBody,
        crate::hierarchy::HierarchyConfig,
        crate::hierarchy::GroupMapping,
        crate::hierarchy::HierarchyLevel,
        crate::translator::TranslatedUserinfo,
        crate::translator::UpstreamUserinfo,
        crate::translator::UpstreamRole,
    )),
    info(
        title = "IDP Redirect Proxy API",
        description = "OAuth2/OIDC redirect proxy with userinfo claims translation",
        version = "1.0.0"
    )
)]
pub(crate) struct ApiDoc;
