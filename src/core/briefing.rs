use crate::domain::model::{Briefing, Candidate, Dashboard, Insight};
use crate::domain::ports::{AnalyticsStore, Assistant};
use crate::utils::error::Result;
use futures::future::try_join_all;

const SELECT_INSIGHT_INSTRUCTIONS: &str = "Your task is to help me select the right metric. I \
    will give you a user question and a list of available metrics. \nSelect the most appropriate \
    metric based on what the user wants.\n\nFirst think through what the user is asking for and \
    what the options are. \n\nThen give me the final answer as the index of the insight that best \
    matches. If no matching index is found, use -1";

const SUMMARIZE_INSIGHT_INSTRUCTIONS: &str = "Your task is to give me a brief professional \
    summary of a analytics result from Posthog. I will give you the query name and the results \
    json, create a short summary that gives the gist of the metrics highlighting the important \
    information and data. Only present the data, do not give suggestions.";

const SELECT_DASHBOARD_INSTRUCTIONS: &str = "Your task is to help select the most relevant \
    dashboard based on a user query. Consider the dashboard names and descriptions to find the \
    best match. \n First think through what the user is asking for and what the options are. \n \
    Then give me the final answer as the index of the dashboard that best matches. If no matching \
    index is found, use -1";

const SUMMARIZE_DASHBOARD_INSTRUCTIONS: &str = "Your task is to give me a brief professional \
    summary of an analytics dashboard from Posthog. I will give you a dashboard name, and a list \
    of insights from that dashboard. Create a short summary that highlights the important \
    insights about the entire dashboard. Only present the condensed insights, not suggestions. \
    Include key metrics and numbers.";

/// The two answer flows: pick the best insight for a question and summarize
/// it, or pick the best dashboard and summarize all of its insights.
#[derive(Clone)]
pub struct BriefingService<A: AnalyticsStore, L: Assistant> {
    analytics: A,
    assistant: L,
}

impl<A: AnalyticsStore, L: Assistant> BriefingService<A, L> {
    pub fn new(analytics: A, assistant: L) -> Self {
        Self {
            analytics,
            assistant,
        }
    }

    pub async fn answer_query(&self, question: &str) -> Result<Briefing> {
        let insights = self.analytics.insights().await?;

        // Filter before enumerating so the indexes the assistant sees always
        // line up with the list we select from.
        let labeled: Vec<Insight> = insights
            .into_iter()
            .filter(|insight| {
                if insight.is_unlabeled() {
                    tracing::warn!(
                        "Skipping insight {} with empty name and description",
                        insight.id
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        if labeled.is_empty() {
            tracing::warn!("No labeled insights available to answer the query");
            return Ok(Briefing::no_matching_insight());
        }

        let candidates: Vec<Candidate> = labeled
            .iter()
            .enumerate()
            .map(|(i, insight)| Candidate {
                id: i,
                name: insight.label(),
                description: None,
            })
            .collect();

        let selected = self
            .assistant
            .choose(SELECT_INSIGHT_INSTRUCTIONS, &candidates, question)
            .await?;
        let Some(index) = selected else {
            return Ok(Briefing::no_matching_insight());
        };

        let insight = &labeled[index];
        tracing::info!("Selected insight {} ({})", insight.id, insight.label());

        let summary = self.summarize_insight(insight).await?;
        let embed_url = self.analytics.insight_embed_url(insight.id).await?;

        Ok(Briefing { summary, embed_url })
    }

    pub async fn summarize_dashboard(&self, question: &str) -> Result<Briefing> {
        let dashboards = self.analytics.dashboards().await?;
        if dashboards.is_empty() {
            tracing::warn!("No dashboards available to summarize");
            return Ok(Briefing::no_matching_dashboard());
        }

        let candidates: Vec<Candidate> = dashboards
            .iter()
            .enumerate()
            .map(|(i, dashboard)| Candidate {
                id: i,
                name: dashboard.name.clone(),
                description: Some(
                    dashboard
                        .description
                        .clone()
                        .unwrap_or_else(|| "No description".to_string()),
                ),
            })
            .collect();

        let selected = self
            .assistant
            .choose(SELECT_DASHBOARD_INSTRUCTIONS, &candidates, question)
            .await?;
        let Some(index) = selected else {
            return Ok(Briefing::no_matching_dashboard());
        };

        let dashboard = &dashboards[index];
        tracing::info!("Selected dashboard {} ({})", dashboard.id, dashboard.name);

        let insights: Vec<Insight> = self
            .analytics
            .insights()
            .await?
            .into_iter()
            .filter(|insight| insight.dashboards.contains(&dashboard.id))
            .collect();

        let summary = self.dashboard_summary(dashboard, &insights).await?;
        let embed_url = self.analytics.dashboard_embed_url(dashboard.id).await?;

        Ok(Briefing { summary, embed_url })
    }

    async fn summarize_insight(&self, insight: &Insight) -> Result<String> {
        let results = insight.result.clone().unwrap_or(serde_json::Value::Null);
        let context = serde_json::to_string(&results)?;
        let focus = format!("Metric: {}", insight.label());

        self.assistant
            .summarize(SUMMARIZE_INSIGHT_INSTRUCTIONS, &context, Some(&focus))
            .await
    }

    async fn dashboard_summary(
        &self,
        dashboard: &Dashboard,
        insights: &[Insight],
    ) -> Result<String> {
        if insights.is_empty() {
            return Ok(format!(
                "Dashboard '{}' has no insights to summarize.",
                dashboard.name
            ));
        }

        // Summarize every insight concurrently, then condense the batch.
        let insight_summaries =
            try_join_all(insights.iter().map(|insight| self.summarize_insight(insight))).await?;

        let mut summary_parts = vec![
            format!(
                "Dashboard: {} - {}",
                dashboard.name,
                dashboard.description.clone().unwrap_or_default()
            ),
            "Insights:".to_string(),
        ];
        for (i, (insight, summary)) in insights.iter().zip(insight_summaries.iter()).enumerate() {
            summary_parts.push(format!(
                "{}. {} - {} - {}",
                i + 1,
                insight.name,
                insight.description,
                summary
            ));
        }
        let combined = summary_parts.join("\n");

        self.assistant
            .summarize(SUMMARIZE_DASHBOARD_INSTRUCTIONS, &combined, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CopilotError;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockAnalytics {
        insights: Vec<Insight>,
        dashboards: Vec<Dashboard>,
        insight_embed: Option<String>,
        dashboard_embed: Option<String>,
    }

    #[async_trait]
    impl AnalyticsStore for MockAnalytics {
        async fn dashboards(&self) -> Result<Vec<Dashboard>> {
            Ok(self.dashboards.clone())
        }

        async fn insights(&self) -> Result<Vec<Insight>> {
            Ok(self.insights.clone())
        }

        async fn insight_embed_url(&self, _insight_id: i64) -> Result<Option<String>> {
            Ok(self.insight_embed.clone())
        }

        async fn dashboard_embed_url(&self, _dashboard_id: i64) -> Result<Option<String>> {
            Ok(self.dashboard_embed.clone())
        }
    }

    #[derive(Clone)]
    struct MockAssistant {
        choice: Option<usize>,
        seen_candidates: Arc<Mutex<Vec<Vec<Candidate>>>>,
        seen_contexts: Arc<Mutex<Vec<String>>>,
    }

    impl MockAssistant {
        fn new(choice: Option<usize>) -> Self {
            Self {
                choice,
                seen_candidates: Arc::new(Mutex::new(Vec::new())),
                seen_contexts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl Assistant for MockAssistant {
        async fn choose(
            &self,
            _instructions: &str,
            candidates: &[Candidate],
            _question: &str,
        ) -> Result<Option<usize>> {
            self.seen_candidates
                .lock()
                .unwrap()
                .push(candidates.to_vec());
            Ok(self.choice)
        }

        async fn summarize(
            &self,
            _instructions: &str,
            context: &str,
            focus: Option<&str>,
        ) -> Result<String> {
            self.seen_contexts.lock().unwrap().push(context.to_string());
            Ok(match focus {
                Some(focus) => format!("summary of {}", focus),
                None => format!("condensed: {}", context),
            })
        }
    }

    fn insight(id: i64, name: &str, description: &str, dashboards: Vec<i64>) -> Insight {
        Insight {
            id,
            short_id: format!("s{}", id),
            name: name.to_string(),
            derived_name: None,
            description: description.to_string(),
            dashboards,
            filters: serde_json::Value::Null,
            query: serde_json::Value::Null,
            result: Some(serde_json::json!([{"count": id * 10}])),
        }
    }

    #[tokio::test]
    async fn test_answer_query_returns_summary_and_embed_url() {
        let analytics = MockAnalytics {
            insights: vec![insight(1, "Signups", "Weekly", vec![])],
            insight_embed: Some("https://ph.example/embedded/tok".to_string()),
            ..Default::default()
        };
        let assistant = MockAssistant::new(Some(0));
        let service = BriefingService::new(analytics, assistant);

        let briefing = service.answer_query("how are signups?").await.unwrap();

        assert_eq!(briefing.summary, "summary of Metric: Signups - Weekly");
        assert_eq!(
            briefing.embed_url.as_deref(),
            Some("https://ph.example/embedded/tok")
        );
    }

    #[tokio::test]
    async fn test_answer_query_filters_unlabeled_insights_before_selection() {
        let analytics = MockAnalytics {
            insights: vec![
                insight(1, "", "", vec![]),
                insight(2, "Churn", "Monthly", vec![]),
            ],
            ..Default::default()
        };
        let assistant = MockAssistant::new(Some(0));
        let seen = assistant.seen_candidates.clone();
        let service = BriefingService::new(analytics, assistant);

        let briefing = service.answer_query("churn?").await.unwrap();

        // Index 0 of the filtered list is the labeled insight, not the blank one.
        assert_eq!(briefing.summary, "summary of Metric: Churn - Monthly");
        let candidates = seen.lock().unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].len(), 1);
        assert_eq!(candidates[0][0].name, "Churn - Monthly");
    }

    #[tokio::test]
    async fn test_answer_query_no_match_returns_fixed_briefing() {
        let analytics = MockAnalytics {
            insights: vec![insight(1, "Signups", "Weekly", vec![])],
            ..Default::default()
        };
        let service = BriefingService::new(analytics, MockAssistant::new(None));

        let briefing = service.answer_query("weather?").await.unwrap();

        assert!(briefing.summary.contains("couldn't find a relevant metric"));
        assert!(briefing.embed_url.is_none());
    }

    #[tokio::test]
    async fn test_answer_query_without_labeled_insights_skips_assistant() {
        let analytics = MockAnalytics {
            insights: vec![insight(1, "", "", vec![])],
            ..Default::default()
        };
        let assistant = MockAssistant::new(Some(0));
        let seen = assistant.seen_candidates.clone();
        let service = BriefingService::new(analytics, assistant);

        let briefing = service.answer_query("anything?").await.unwrap();

        assert!(briefing.summary.contains("couldn't find a relevant metric"));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_dashboard_combines_member_insights() {
        let analytics = MockAnalytics {
            dashboards: vec![Dashboard {
                id: 7,
                name: "Growth".to_string(),
                description: Some("Core growth metrics".to_string()),
            }],
            insights: vec![
                insight(1, "Signups", "Weekly", vec![7]),
                insight(2, "Churn", "Monthly", vec![7]),
                insight(3, "Latency", "p95", vec![9]), // other dashboard
            ],
            dashboard_embed: Some("https://ph.example/embedded/dash".to_string()),
            ..Default::default()
        };
        let assistant = MockAssistant::new(Some(0));
        let contexts = assistant.seen_contexts.clone();
        let service = BriefingService::new(analytics, assistant);

        let briefing = service.summarize_dashboard("growth?").await.unwrap();

        assert_eq!(
            briefing.embed_url.as_deref(),
            Some("https://ph.example/embedded/dash")
        );

        // The final summarize call receives the combined, numbered digest.
        let contexts = contexts.lock().unwrap();
        let combined = contexts.last().unwrap();
        assert!(combined.starts_with("Dashboard: Growth - Core growth metrics"));
        assert!(combined.contains("1. Signups - Weekly"));
        assert!(combined.contains("2. Churn - Monthly"));
        assert!(!combined.contains("Latency"));
        assert!(briefing.summary.starts_with("condensed:"));
    }

    #[tokio::test]
    async fn test_summarize_dashboard_without_insights_uses_fixed_sentence() {
        let analytics = MockAnalytics {
            dashboards: vec![Dashboard {
                id: 7,
                name: "Empty".to_string(),
                description: None,
            }],
            dashboard_embed: Some("https://ph.example/embedded/dash".to_string()),
            ..Default::default()
        };
        let service = BriefingService::new(analytics, MockAssistant::new(Some(0)));

        let briefing = service.summarize_dashboard("anything").await.unwrap();

        assert_eq!(
            briefing.summary,
            "Dashboard 'Empty' has no insights to summarize."
        );
        // Embed URL is still resolved for the selected dashboard.
        assert!(briefing.embed_url.is_some());
    }

    #[tokio::test]
    async fn test_analytics_errors_propagate() {
        #[derive(Clone)]
        struct FailingAnalytics;

        #[async_trait]
        impl AnalyticsStore for FailingAnalytics {
            async fn dashboards(&self) -> Result<Vec<Dashboard>> {
                Err(CopilotError::UpstreamError {
                    service: "posthog",
                    status: 500,
                    body: "boom".to_string(),
                })
            }
            async fn insights(&self) -> Result<Vec<Insight>> {
                Err(CopilotError::UpstreamError {
                    service: "posthog",
                    status: 500,
                    body: "boom".to_string(),
                })
            }
            async fn insight_embed_url(&self, _: i64) -> Result<Option<String>> {
                Ok(None)
            }
            async fn dashboard_embed_url(&self, _: i64) -> Result<Option<String>> {
                Ok(None)
            }
        }

        let service = BriefingService::new(FailingAnalytics, MockAssistant::new(Some(0)));
        assert!(service.answer_query("q").await.is_err());
        assert!(service.summarize_dashboard("q").await.is_err());
    }
}
