// Backend flow rule endpoints
//
// Rules are keyed by a backend-wide `rule_id`; creation additionally
// targets a switch by datapath id.

use tracing::debug;

use crate::backend::client::BackendClient;
use crate::backend::models::{
    FlowRuleBody, FlowRuleDto, FlowRuleListPayload, FlowRuleLogDto, MessageEnvelope,
    NextRuleIdDto,
};
use crate::error::Error;

impl BackendClient {
    /// List all stored flow rules.
    ///
    /// `GET /reglas/`
    pub async fn list_flow_rules(&self) -> Result<Vec<FlowRuleDto>, Error> {
        let url = self.api_url("reglas/")?;
        let payload: FlowRuleListPayload = self.get(url).await?;
        Ok(payload.switches)
    }

    /// `GET /reglas/buscar/{rule_id}`
    pub async fn get_flow_rule(&self, rule_id: i64) -> Result<FlowRuleDto, Error> {
        let url = self.api_url(&format!("reglas/buscar/{rule_id}"))?;
        self.get(url).await
    }

    /// `POST /reglas/{dpid}`
    pub async fn create_flow_rule(&self, dpid: u64, rule: &FlowRuleBody) -> Result<String, Error> {
        let url = self.api_url(&format!("reglas/{dpid}"))?;
        debug!(dpid, rule_id = rule.rule_id, "creating flow rule");
        let envelope: MessageEnvelope = self.post(url, rule).await?;
        Ok(Self::message_of(envelope, "rule added"))
    }

    /// `PUT /reglas/modificar/{rule_id}`
    pub async fn update_flow_rule(&self, rule_id: i64, rule: &FlowRuleBody) -> Result<String, Error> {
        let url = self.api_url(&format!("reglas/modificar/{rule_id}"))?;
        debug!(rule_id, "updating flow rule");
        let envelope: MessageEnvelope = self.put(url, rule).await?;
        Ok(Self::message_of(envelope, "rule updated"))
    }

    /// `DELETE /reglas/eliminar/{rule_id}`
    pub async fn delete_flow_rule(&self, rule_id: i64) -> Result<String, Error> {
        let url = self.api_url(&format!("reglas/eliminar/{rule_id}"))?;
        debug!(rule_id, "deleting flow rule");
        let envelope: MessageEnvelope = self.delete(url, None::<&()>).await?;
        Ok(Self::message_of(envelope, "rule deleted"))
    }

    /// Rule change history, newest first.
    ///
    /// `GET /reglas/logs`
    ///
    /// An empty history comes back as `{message}` rather than `[]`.
    pub async fn list_flow_rule_logs(&self) -> Result<Vec<FlowRuleLogDto>, Error> {
        let url = self.api_url("reglas/logs")?;
        let value: serde_json::Value = self.get(url).await?;
        if value.is_array() {
            serde_json::from_value(value).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: String::new(),
            })
        } else {
            Ok(Vec::new())
        }
    }

    /// The next free rule id.
    ///
    /// `GET /reglas/max_rule_id`
    pub async fn next_flow_rule_id(&self) -> Result<i64, Error> {
        let url = self.api_url("reglas/max_rule_id")?;
        let payload: NextRuleIdDto = self.get(url).await?;
        Ok(payload.next_rule_id)
    }
}
