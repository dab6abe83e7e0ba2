//! Rest-hook channel strategy: idempotent upsert delivery over HTTP.

use crate::channel::transport::{RestMethod, RestRequest, RestTransport};
use crate::channel::DeliveryChannel;
use crate::error::DispatchError;
use crate::model::{ChangeOperation, DeliveryOutcome, ResourceChangeEvent};
use crate::observability::events;
use crate::payload::ResolvedContent;
use async_trait::async_trait;
use std::sync::Arc;
use subscription_cache::CanonicalSubscription;
use tracing::{error, info};

const COMPONENT: &str = "rest_hook_channel";

pub(crate) struct RestHookChannel {
    transport: Arc<dyn RestTransport>,
}

impl RestHookChannel {
    pub(crate) fn new(transport: Arc<dyn RestTransport>) -> Self {
        Self { transport }
    }

    fn identity_url(endpoint: &str, content: &ResolvedContent) -> String {
        format!(
            "{}/{}",
            endpoint.trim_end_matches('/'),
            content.identity.reference()
        )
    }
}

#[async_trait]
impl DeliveryChannel for RestHookChannel {
    /// Maps the originating operation onto the outbound request.
    ///
    /// Creates and updates with a payload both become an upsert keyed by the
    /// resolved identity, so replaying the same notification under
    /// at-least-once redelivery cannot create duplicate downstream state.
    /// Without a resolved payload the channel falls back to a contentless
    /// trigger notification.
    async fn deliver(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        content: &ResolvedContent,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let endpoint = subscription.channel.endpoint.trim();
        if endpoint.is_empty() {
            return Err(DispatchError::configuration(
                subscription.id.to_string(),
                "rest-hook subscription has no endpoint",
            ));
        }

        let headers = subscription.channel.parsed_headers();
        let encoding = subscription.channel.effective_encoding();

        let request = match (event.operation, &content.body, encoding) {
            (ChangeOperation::Delete, _, _) => RestRequest {
                method: RestMethod::Delete,
                url: Self::identity_url(endpoint, content),
                headers,
                body: None,
                content_type: None,
            },
            (_, Some(body), Some(encoding)) => RestRequest {
                method: RestMethod::Put,
                url: Self::identity_url(endpoint, content),
                headers,
                body: Some(encoding.render(body)),
                content_type: Some(encoding.content_type()),
            },
            // Create-style insert: an encoding is configured but no content
            // was resolved.
            (_, None, Some(_)) => RestRequest {
                method: RestMethod::Post,
                url: endpoint.to_string(),
                headers,
                body: None,
                content_type: None,
            },
            // Contentless trigger notification.
            (_, _, None) => RestRequest {
                method: RestMethod::Post,
                url: endpoint.to_string(),
                headers,
                body: None,
                content_type: None,
            },
        };

        info!(
            event = events::REST_HOOK_DELIVERY,
            component = COMPONENT,
            subscription_id = %subscription.id,
            operation = %event.operation,
            method = request.method.as_str(),
            url = %request.url,
            "delivering rest-hook notification"
        );

        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => Ok(DeliveryOutcome::Delivered),
            Ok(response) => {
                error!(
                    event = events::REST_HOOK_DELIVERY_FAILED,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    url = %endpoint,
                    status = response.status,
                    "cannot reach rest-hook endpoint"
                );
                Err(DispatchError::delivery(
                    endpoint,
                    format!("endpoint answered HTTP {}", response.status),
                ))
            }
            Err(err) => {
                error!(
                    event = events::REST_HOOK_DELIVERY_FAILED,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    url = %endpoint,
                    err = %err,
                    "cannot reach rest-hook endpoint"
                );
                Err(DispatchError::delivery(endpoint, err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RestHookChannel;
    use crate::channel::transport::{RestMethod, RestRequest, RestResponse, RestTransport, TransportError};
    use crate::channel::DeliveryChannel;
    use crate::error::DispatchError;
    use crate::model::{ChangeOperation, DeliveryOutcome, ResourceChangeEvent, ResourceIdentity};
    use crate::payload::ResolvedContent;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use subscription_cache::{
        CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
    };

    #[derive(Default)]
    struct RecordingTransport {
        requests: StdMutex<Vec<RestRequest>>,
        status: StdMutex<u16>,
    }

    impl RecordingTransport {
        fn with_status(status: u16) -> Arc<Self> {
            let transport = Self::default();
            *transport.status.lock().expect("lock status") = status;
            Arc::new(transport)
        }

        fn recorded(&self) -> Vec<RestRequest> {
            self.requests.lock().expect("lock requests").clone()
        }
    }

    #[async_trait]
    impl RestTransport for RecordingTransport {
        async fn execute(&self, request: RestRequest) -> Result<RestResponse, TransportError> {
            self.requests.lock().expect("lock requests").push(request);
            Ok(RestResponse {
                status: *self.status.lock().expect("lock status"),
            })
        }
    }

    fn subscription(
        endpoint: &str,
        payload_content_type: Option<&str>,
        headers: Vec<&str>,
    ) -> CanonicalSubscription {
        CanonicalSubscription {
            id: SubscriptionId::new("sub-1"),
            criteria: "Observation?".to_string(),
            status: SubscriptionStatus::Active,
            channel: ChannelConfig {
                kind: ChannelKind::RestHook,
                endpoint: endpoint.to_string(),
                headers: headers.into_iter().map(str::to_string).collect(),
                payload_content_type: payload_content_type.map(str::to_string),
                deliver_latest_version: false,
                strip_version_id: false,
            },
        }
    }

    fn content(body: Option<serde_json::Value>) -> ResolvedContent {
        ResolvedContent {
            identity: ResourceIdentity::new("Observation", "123"),
            body,
        }
    }

    fn create_event() -> ResourceChangeEvent {
        ResourceChangeEvent::new(
            ChangeOperation::Create,
            ResourceIdentity::new("Observation", "123"),
        )
    }

    #[tokio::test]
    async fn create_with_payload_upserts_by_identity() {
        let transport = RecordingTransport::with_status(200);
        let channel = RestHookChannel::new(transport.clone());
        let body = json!({"resourceType": "Observation", "id": "123"});

        let outcome = channel
            .deliver(
                &create_event(),
                &subscription("http://sub.example/hook/", Some("application/json"), vec![]),
                &content(Some(body.clone())),
            )
            .await
            .expect("delivery succeeds");

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, RestMethod::Put);
        assert_eq!(recorded[0].url, "http://sub.example/hook/Observation/123");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(
                recorded[0].body.as_deref().expect("body present")
            )
            .expect("valid JSON body"),
            body
        );
        assert_eq!(recorded[0].content_type, Some("application/json"));
    }

    #[tokio::test]
    async fn update_with_payload_uses_same_upsert_as_create() {
        let transport = RecordingTransport::with_status(200);
        let channel = RestHookChannel::new(transport.clone());
        let event = ResourceChangeEvent::new(
            ChangeOperation::Update,
            ResourceIdentity::new("Observation", "123"),
        );

        channel
            .deliver(
                &event,
                &subscription("http://sub.example/hook", Some("application/json"), vec![]),
                &content(Some(json!({"id": "123"}))),
            )
            .await
            .expect("delivery succeeds");

        assert_eq!(transport.recorded()[0].method, RestMethod::Put);
    }

    #[tokio::test]
    async fn delete_sends_delete_by_identity_without_body() {
        let transport = RecordingTransport::with_status(204);
        let channel = RestHookChannel::new(transport.clone());
        let event = ResourceChangeEvent::new(
            ChangeOperation::Delete,
            ResourceIdentity::new("Observation", "123"),
        );

        let outcome = channel
            .deliver(
                &event,
                &subscription("http://sub.example/hook", Some("application/json"), vec![]),
                &content(None),
            )
            .await
            .expect("delivery succeeds");

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        let recorded = transport.recorded();
        assert_eq!(recorded[0].method, RestMethod::Delete);
        assert_eq!(recorded[0].url, "http://sub.example/hook/Observation/123");
        assert_eq!(recorded[0].body, None);
    }

    #[tokio::test]
    async fn no_encoding_sends_contentless_notify_post() {
        let transport = RecordingTransport::with_status(200);
        let channel = RestHookChannel::new(transport.clone());

        channel
            .deliver(
                &create_event(),
                &subscription("http://sub.example/hook", None, vec![]),
                &content(None),
            )
            .await
            .expect("delivery succeeds");

        let recorded = transport.recorded();
        assert_eq!(recorded[0].method, RestMethod::Post);
        assert_eq!(recorded[0].url, "http://sub.example/hook");
        assert_eq!(recorded[0].body, None);
        assert_eq!(recorded[0].content_type, None);
    }

    #[tokio::test]
    async fn configured_headers_attach_verbatim_and_malformed_lines_drop() {
        let transport = RecordingTransport::with_status(200);
        let channel = RestHookChannel::new(transport.clone());

        channel
            .deliver(
                &create_event(),
                &subscription(
                    "http://sub.example/hook",
                    None,
                    vec!["Authorization: Bearer token", "", "broken-line"],
                ),
                &content(None),
            )
            .await
            .expect("delivery succeeds");

        assert_eq!(
            transport.recorded()[0].headers,
            vec![("Authorization".to_string(), "Bearer token".to_string())]
        );
    }

    #[tokio::test]
    async fn not_found_class_response_surfaces_as_delivery_failure() {
        let transport = RecordingTransport::with_status(404);
        let channel = RestHookChannel::new(transport);

        let delivered = channel
            .deliver(
                &create_event(),
                &subscription("http://sub.example/hook", Some("application/json"), vec![]),
                &content(Some(json!({"id": "123"}))),
            )
            .await;

        assert!(matches!(delivered, Err(DispatchError::Delivery { .. })));
    }

    #[tokio::test]
    async fn missing_endpoint_fails_fast_without_network_call() {
        let transport = RecordingTransport::with_status(200);
        let channel = RestHookChannel::new(transport.clone());

        let delivered = channel
            .deliver(
                &create_event(),
                &subscription("   ", Some("application/json"), vec![]),
                &content(Some(json!({"id": "123"}))),
            )
            .await;

        assert!(matches!(
            delivered,
            Err(DispatchError::Configuration { .. })
        ));
        assert!(transport.recorded().is_empty());
    }
}
