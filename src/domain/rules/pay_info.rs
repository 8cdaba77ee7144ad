use super::DocumentRule;
use crate::domain::context::ValidationContext;
use crate::domain::document::{ParsedDocument, tags};
use crate::domain::graph::Vertex;
use crate::domain::ports::SharedGraph;
use crate::error::Result;
use async_trait::async_trait;

/// Revenue code, payment type and payment ground must form one path
/// `code -> type -> ground` in the dependency graph.
pub struct PayInfoRule {
    graph: SharedGraph,
}

impl PayInfoRule {
    pub fn new(graph: SharedGraph) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl DocumentRule for PayInfoRule {
    fn name(&self) -> &'static str {
        "pay_info"
    }

    async fn validate(
        &self,
        document: &ParsedDocument,
        context: &mut ValidationContext,
    ) -> Result<bool> {
        let code = Vertex::revenue_code(document.value_of(tags::CODE_REV).unwrap_or_default());
        let pay_type =
            Vertex::payment_type(document.value_of(tags::PAY_TYPE_PARAM).unwrap_or_default());
        let ground =
            Vertex::payment_ground(document.value_of(tags::PAY_GRND_PARAM).unwrap_or_default());

        let missing = [
            (
                &code,
                "Код программы доходов бюджетов не найден в графе зависимостей",
                tags::CODE_REV,
            ),
            (
                &pay_type,
                "Тип платежа не найден в графе зависимостей",
                tags::PAY_TYPE_PARAM,
            ),
            (
                &ground,
                "Основание платежа не найдено в графе зависимостей",
                tags::PAY_GRND_PARAM,
            ),
        ]
        .into_iter()
        .find(|(vertex, _, _)| !self.graph.contains_vertex(vertex));

        if let Some((_, message, field)) = missing {
            context.add_message(message, &[field]);
            return Ok(false);
        }

        if self.graph.contains_edge(&code, &pay_type) && self.graph.contains_edge(&pay_type, &ground)
        {
            return Ok(true);
        }
        context.add_message(
            "Код программы доходов бюджетов, тип платежа и основание платежа не имеют единой связи",
            &[tags::CODE_REV, tags::PAY_TYPE_PARAM, tags::PAY_GRND_PARAM],
        );
        Ok(false)
    }
}
