//! Shared test doubles for the crate's unit tests.

use std::{
    collections::HashMap,
    ffi::c_void,
    sync::{Arc, Mutex},
};

use crate::{
    config::DEFAULT_MODULE_NAME,
    forward::{CallObserver, SubmitPayload},
    runtime::{
        FnAddr, InstanceHandle, InterceptBackend, InterceptId, ModuleHandle, ModuleProbe,
        Replacement,
    },
    Error, Result,
};

// Helper function to create a non-null instance handle at a fake address
pub fn instance(addr: usize) -> InstanceHandle {
    InstanceHandle::new(addr as *mut c_void).unwrap()
}

// Fake original implementation returned for an intercept
pub fn fake_original(id: InterceptId) -> FnAddr {
    FnAddr::new(0x1000 + id as usize * 0x10)
}

#[derive(Default)]
struct BackendLog {
    exports: Vec<(String, ModuleHandle)>,
    slots: Vec<(String, usize, InterceptId, InstanceHandle)>,
    removed: Vec<InterceptId>,
    live: HashMap<InterceptId, FnAddr>,
    fail_on: Option<InterceptId>,
}

/// Interception backend that patches nothing and records every request.
///
/// Clones share the same log, so a test can keep one clone after moving another into a
/// [`crate::Shim`].
#[derive(Clone, Default)]
pub struct MockBackend {
    log: Arc<Mutex<BackendLog>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(self, id: InterceptId) -> Self {
        self.log.lock().unwrap().fail_on = Some(id);
        self
    }

    pub fn clear_failure(&self) {
        self.log.lock().unwrap().fail_on = None;
    }

    pub fn export_installs(&self) -> Vec<(String, ModuleHandle)> {
        self.log.lock().unwrap().exports.clone()
    }

    pub fn slot_installs(&self) -> Vec<(String, usize, InterceptId)> {
        self.log
            .lock()
            .unwrap()
            .slots
            .iter()
            .map(|(label, slot, id, _)| (label.clone(), *slot, *id))
            .collect()
    }

    pub fn slot_instances(&self) -> Vec<InstanceHandle> {
        self.log
            .lock()
            .unwrap()
            .slots
            .iter()
            .map(|(_, _, _, instance)| *instance)
            .collect()
    }

    pub fn removed(&self) -> Vec<InterceptId> {
        self.log.lock().unwrap().removed.clone()
    }

    fn check(log: &BackendLog, id: InterceptId) -> Result<()> {
        if log.fail_on == Some(id) {
            return Err(Error::Error(format!("refusing to patch {id}")));
        }
        Ok(())
    }
}

impl InterceptBackend for MockBackend {
    fn install_export(
        &self,
        export: &str,
        module: ModuleHandle,
        replacement: Replacement,
    ) -> Result<FnAddr> {
        let mut log = self.log.lock().unwrap();
        Self::check(&log, replacement.id)?;
        log.exports.push((export.to_string(), module));
        log.live.insert(replacement.id, fake_original(replacement.id));
        Ok(fake_original(replacement.id))
    }

    fn install_slot(
        &self,
        label: &str,
        instance: InstanceHandle,
        slot: usize,
        replacement: Replacement,
    ) -> Result<FnAddr> {
        let mut log = self.log.lock().unwrap();
        Self::check(&log, replacement.id)?;
        log.slots
            .push((label.to_string(), slot, replacement.id, instance));
        log.live.insert(replacement.id, fake_original(replacement.id));
        Ok(fake_original(replacement.id))
    }

    fn remove(&self, replacement: Replacement) {
        let mut log = self.log.lock().unwrap();
        log.live.remove(&replacement.id);
        log.removed.push(replacement.id);
    }

    fn original(&self, replacement: Replacement) -> Option<FnAddr> {
        self.log.lock().unwrap().live.get(&replacement.id).copied()
    }
}

/// Module probe answering from a fixed description of the process.
#[derive(Clone, Debug)]
pub struct MockProbe {
    name: String,
    module: Option<ModuleHandle>,
    hosting: ModuleHandle,
}

impl MockProbe {
    pub fn absent() -> Self {
        Self {
            name: DEFAULT_MODULE_NAME.to_string(),
            module: None,
            hosting: ModuleHandle::new(0x1),
        }
    }

    pub fn loaded(module: ModuleHandle) -> Self {
        Self {
            module: Some(module),
            ..Self::absent()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn hosting(mut self, module: ModuleHandle) -> Self {
        self.hosting = module;
        self
    }
}

impl ModuleProbe for MockProbe {
    fn loaded_module(&self, name: &str) -> Option<ModuleHandle> {
        if name == self.name {
            self.module
        } else {
            None
        }
    }

    fn self_module(&self) -> ModuleHandle {
        self.hosting
    }
}

// Submitted payloads carry raw texture handles; the observer only stores them for inspection.
struct Seen(SubmitPayload);
unsafe impl Send for Seen {}

/// Observer recording every call and optionally adjusting it.
#[derive(Default)]
pub struct RecordingObserver {
    scale: Option<u32>,
    substitute: Option<usize>,
    sizes: Mutex<Vec<(u32, u32)>>,
    submits: Mutex<Vec<Seen>>,
}

impl RecordingObserver {
    /// Multiplies every reported render target size by `factor`.
    pub fn scaling(factor: u32) -> Self {
        Self {
            scale: Some(factor),
            ..Self::default()
        }
    }

    /// Replaces the handle of every submitted texture.
    pub fn substituting_handle(handle: *mut c_void) -> Self {
        Self {
            substitute: Some(handle as usize),
            ..Self::default()
        }
    }

    pub fn size_queries(&self) -> Vec<(u32, u32)> {
        self.sizes.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SubmitPayload> {
        self.submits.lock().unwrap().iter().map(|s| s.0).collect()
    }
}

impl CallObserver for RecordingObserver {
    fn on_size_query_result(&self, width: &mut u32, height: &mut u32) {
        self.sizes.lock().unwrap().push((*width, *height));
        if let Some(factor) = self.scale {
            *width *= factor;
            *height *= factor;
        }
    }

    fn on_submit(&self, payload: &mut SubmitPayload) {
        self.submits.lock().unwrap().push(Seen(*payload));
        if let Some(handle) = self.substitute {
            payload.texture.handle = handle as *mut c_void;
        }
    }
}
