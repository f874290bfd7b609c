//! Scripted quality gate API fake for reconciler tests.
//!
//! Responses are queued per operation and consumed in order; every call is
//! recorded so tests can assert exactly which remote operations a cycle
//! issued. An operation with an empty queue answers with a network error
//! naming the unexpected call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use sonargate_client::{
    ApiError, ConditionHandle, CreateCondition, CreateGate, GateHandle, GateShow, QualityGates,
    UpdateCondition,
};
use sonargate_core::ConditionOperator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Show {
        name: String,
    },
    Create {
        name: String,
    },
    Rename {
        current_name: String,
        new_name: String,
    },
    SetAsDefault {
        name: String,
    },
    Destroy {
        name: String,
    },
    CreateCondition {
        gate_name: String,
        metric: String,
        error: String,
        op: Option<ConditionOperator>,
    },
    UpdateCondition {
        id: String,
        metric: String,
        error: String,
        op: Option<ConditionOperator>,
    },
    DeleteCondition {
        id: String,
    },
}

#[derive(Default)]
pub struct FakeQualityGates {
    show: Mutex<VecDeque<Result<GateShow, ApiError>>>,
    create: Mutex<VecDeque<Result<GateHandle, ApiError>>>,
    rename: Mutex<VecDeque<Result<(), ApiError>>>,
    set_as_default: Mutex<VecDeque<Result<(), ApiError>>>,
    destroy: Mutex<VecDeque<Result<(), ApiError>>>,
    create_condition: Mutex<VecDeque<Result<ConditionHandle, ApiError>>>,
    update_condition: Mutex<VecDeque<Result<(), ApiError>>>,
    delete_condition: Mutex<VecDeque<Result<(), ApiError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeQualityGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_show(&self, response: Result<GateShow, ApiError>) {
        self.show.lock().unwrap().push_back(response);
    }

    pub fn queue_create(&self, response: Result<GateHandle, ApiError>) {
        self.create.lock().unwrap().push_back(response);
    }

    pub fn queue_rename(&self, response: Result<(), ApiError>) {
        self.rename.lock().unwrap().push_back(response);
    }

    pub fn queue_set_as_default(&self, response: Result<(), ApiError>) {
        self.set_as_default.lock().unwrap().push_back(response);
    }

    pub fn queue_destroy(&self, response: Result<(), ApiError>) {
        self.destroy.lock().unwrap().push_back(response);
    }

    pub fn queue_create_condition(&self, response: Result<ConditionHandle, ApiError>) {
        self.create_condition.lock().unwrap().push_back(response);
    }

    pub fn queue_update_condition(&self, response: Result<(), ApiError>) {
        self.update_condition.lock().unwrap().push_back(response);
    }

    pub fn queue_delete_condition(&self, response: Result<(), ApiError>) {
        self.delete_condition.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unexpected(op: &str) -> ApiError {
        ApiError::Network(format!("unexpected {op} call"))
    }
}

#[async_trait]
impl QualityGates for FakeQualityGates {
    async fn show(&self, name: &str) -> Result<GateShow, ApiError> {
        self.record(Call::Show {
            name: name.to_string(),
        });
        self.show
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("show")))
    }

    async fn create(&self, req: &CreateGate) -> Result<GateHandle, ApiError> {
        self.record(Call::Create {
            name: req.name.clone(),
        });
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("create")))
    }

    async fn rename(&self, current_name: &str, new_name: &str) -> Result<(), ApiError> {
        self.record(Call::Rename {
            current_name: current_name.to_string(),
            new_name: new_name.to_string(),
        });
        self.rename
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("rename")))
    }

    async fn set_as_default(&self, name: &str) -> Result<(), ApiError> {
        self.record(Call::SetAsDefault {
            name: name.to_string(),
        });
        self.set_as_default
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("set_as_default")))
    }

    async fn destroy(&self, name: &str) -> Result<(), ApiError> {
        self.record(Call::Destroy {
            name: name.to_string(),
        });
        self.destroy
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("destroy")))
    }

    async fn create_condition(&self, req: &CreateCondition) -> Result<ConditionHandle, ApiError> {
        self.record(Call::CreateCondition {
            gate_name: req.gate_name.clone(),
            metric: req.metric.clone(),
            error: req.error.clone(),
            op: req.op,
        });
        self.create_condition
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("create_condition")))
    }

    async fn update_condition(&self, req: &UpdateCondition) -> Result<(), ApiError> {
        self.record(Call::UpdateCondition {
            id: req.id.clone(),
            metric: req.metric.clone(),
            error: req.error.clone(),
            op: req.op,
        });
        self.update_condition
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("update_condition")))
    }

    async fn delete_condition(&self, id: &str) -> Result<(), ApiError> {
        self.record(Call::DeleteCondition { id: id.to_string() });
        self.delete_condition
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Self::unexpected("delete_condition")))
    }
}
