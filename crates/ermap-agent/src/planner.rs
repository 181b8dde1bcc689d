//! Dispatch planning: turns resolved distances and inventory into a
//! written command plan using a reasoning-enabled chat model.

use ermap_core::{AppConfig, WarehouseDataset};
use ermap_distance::OriginReport;

use crate::chat::{ChatClient, ChatMessage, ChatOptions};
use crate::conversation::Conversation;
use crate::error::AgentError;
use crate::render;

const PLANNER_INSTRUCTION: &str = "\
你是一个专业的消防应急作战决策专家，具备丰富的火灾扑救和应急救援经验。你的任务是基于提供的信息制定科学、高效的作战规划。

核心职责：
1. 分析火灾情况和现场条件
2. 评估可用资源（人员、车辆、装备）
3. 制定分层次的作战计划
4. 优化资源配置和调度

决策原则：
- 人员安全第一
- 快速响应，科学部署
- 资源优化配置
- 分级分类处置

请始终保持专业、准确、高效的决策风格。";

/// Everything the planner is told about one incident.
#[derive(Debug, Clone, Copy)]
pub struct PlanningRequest<'a> {
    pub incident_location: &'a str,
    pub departure_location: &'a str,
    pub personnel: u32,
    pub vehicles: u32,
    pub fire_description: &'a str,
    /// Incident → warehouse distances.
    pub incident_distances: &'a OriginReport,
    /// Departure → warehouse distances.
    pub departure_distances: &'a OriginReport,
    /// Inventory and the stored inter-warehouse table.
    pub dataset: &'a WarehouseDataset,
}

impl PlanningRequest<'_> {
    /// The user message sent to the model. Only successful distances appear.
    #[must_use]
    pub fn prompt(&self) -> String {
        let warehouse_info = render::warehouse_overview(self.dataset);
        let incident = render::distance_lines(self.incident_distances);
        let departure = render::distance_lines(self.departure_distances);
        let inter = render::inter_warehouse_lines(self.dataset);
        let incident_location = self.incident_location;
        let departure_location = self.departure_location;

        format!(
            "请根据以下信息，制定详细的消防作战指挥方案：

## 火灾情况
- 事发地点：{incident_location}
- 火灾详情：{fire}

## 可用资源
- 出发地点：{departure_location}
- 人员数量：{personnel}人
- 车辆数量：{vehicles}辆

## 仓库信息
{warehouse_info}

## 距离信息
### 事发地点到各仓库距离：
{incident}

### 出发地点到各仓库距离：
{departure}

### 仓库间距离：
{inter}

**重要提醒：请严格按照上述提供的距离信息来计算时间，不要随意估算！**

请按以下结构提供作战指挥方案：

## 一、人员车辆分配与物资获取
按批次给出人员配置、目标仓库（从{departure_location}出发）、获取装备清单及数量、预计时间（到达仓库用时与装载用时）。

## 二、救援路线与时间安排
给出主力救援路线（从仓库前往{incident_location}）、预计时间，以及总用时 = 出发到仓库 + 装载物资 + 仓库到现场。如需物资补充，根据仓库间距离给出补充路线。

## 三、资源需求评估
说明仓库现有物资的充足性，以及需要向总部呼叫的紧急物资和理由。

## 四、作战时间节点
按 T+X分钟 列出出发、到达仓库、完成装载、到达现场的时间节点。

**请务必使用上述提供的准确距离和时间信息，不要自行估算或使用不合理的时间（如0分钟、1分钟等）。**",
            fire = self.fire_description,
            personnel = self.personnel,
            vehicles = self.vehicles,
        )
    }
}

/// Drafts dispatch plans, keeping the exchange as conversation history so
/// follow-up questions see earlier plans until [`reset_conversation`] is
/// called.
///
/// [`reset_conversation`]: DispatchPlanner::reset_conversation
pub struct DispatchPlanner {
    chat: ChatClient,
    options: ChatOptions,
    conversation: Conversation,
}

impl DispatchPlanner {
    #[must_use]
    pub fn new(chat: ChatClient) -> Self {
        Self {
            chat,
            options: ChatOptions::planning(),
            conversation: Conversation::new(PLANNER_INSTRUCTION),
        }
    }

    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if no API key is configured, or
    /// [`AgentError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        let chat = ChatClient::new(
            &config.llm_api_base,
            config.require_llm_api_key()?,
            &config.llm_model,
            config.request_timeout_secs,
        )?;
        Ok(Self::new(chat))
    }

    /// Asks the model for a plan and returns its text.
    ///
    /// # Errors
    ///
    /// Any chat transport or decoding error; the conversation is left
    /// without the failed exchange.
    pub async fn make_decision(&mut self, request: &PlanningRequest<'_>) -> Result<String, AgentError> {
        tracing::info!(
            incident = request.incident_location,
            departure = request.departure_location,
            personnel = request.personnel,
            vehicles = request.vehicles,
            "requesting dispatch plan"
        );

        let mut messages = self.conversation.messages().to_vec();
        messages.push(ChatMessage::user(request.prompt()));

        let plan = self.chat.complete(&messages, &self.options).await?;

        if let Some(prompt) = messages.pop() {
            self.conversation.push(prompt);
        }
        self.conversation.push(ChatMessage::assistant(plan.clone()));
        Ok(plan)
    }

    /// Drops all history except the planning instruction.
    pub fn reset_conversation(&mut self) {
        self.conversation.reset();
        tracing::debug!("planner conversation reset");
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
