//! Components
//!
//! A component ties one data object to one render function through a single
//! [`Watcher`]. The watcher's callback renders a fresh tree description and
//! hands it to the reconciler together with the description from the
//! previous run: the first run mounts, every later run patches.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::reactive::{ReactiveObject, Watcher};
use crate::render::{self, HostTree, NodeId, VNode};

/// Where the component lives in the host tree and what it rendered last.
struct RenderState {
    parent: NodeId,
    /// Consumed by the first mount.
    placeholder: Option<NodeId>,
    vnode: Option<VNode>,
}

impl RenderState {
    fn apply<H: HostTree + ?Sized>(&mut self, host: &mut H, mut vnode: VNode) -> Result<()> {
        match self.vnode.take() {
            None => {
                render::mount(host, self.parent, self.placeholder, &mut vnode)?;
                self.placeholder = None;
            }
            Some(previous) => {
                if let Err(err) = render::patch(host, self.parent, &previous, &mut vnode) {
                    self.vnode = Some(previous);
                    return Err(err);
                }
            }
        }

        self.vnode = Some(vnode);
        Ok(())
    }
}

/// A mounted component.
pub struct Component<H: HostTree + Send + 'static> {
    data: ReactiveObject,
    host: Arc<Mutex<H>>,
    state: Arc<Mutex<RenderState>>,
    watcher: Watcher,
}

impl<H: HostTree + Send + 'static> Component<H> {
    /// Render `data` into `host` under `parent` and keep it up to date.
    ///
    /// If `placeholder` is given, the rendered tree takes its place.
    pub fn mount<R>(
        data: ReactiveObject,
        host: Arc<Mutex<H>>,
        parent: NodeId,
        placeholder: Option<NodeId>,
        render: R,
    ) -> Result<Self>
    where
        R: Fn(&ReactiveObject) -> VNode + Send + Sync + 'static,
    {
        let state = Arc::new(Mutex::new(RenderState {
            parent,
            placeholder,
            vnode: None,
        }));

        let watcher = Watcher::new({
            let data = data.clone();
            let host = host.clone();
            let state = state.clone();
            move || {
                // Render before taking any lock: this is where reads are tracked.
                let vnode = render(&data);
                let mut host = host.lock();
                let mut render_state = state.lock();
                render_state.apply(&mut *host, vnode)
            }
        })?;

        debug!(watcher = %watcher.id(), "component mounted");

        Ok(Self {
            data,
            host,
            state,
            watcher,
        })
    }

    /// The component's observed data.
    pub fn data(&self) -> &ReactiveObject {
        &self.data
    }

    /// The host tree the component renders into.
    pub fn host(&self) -> &Arc<Mutex<H>> {
        &self.host
    }

    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// The host node the current tree is rendered into.
    pub fn root(&self) -> Option<NodeId> {
        self.state.lock().vnode.as_ref().and_then(VNode::elm)
    }

    /// Number of renders so far, including the mount.
    pub fn render_count(&self) -> usize {
        self.watcher.run_count()
    }

    /// Stop reacting to data changes and remove the rendered tree.
    pub fn unmount(self) -> Result<()> {
        self.watcher.dispose();

        let mut host = self.host.lock();
        let mut state = self.state.lock();
        if let Some(root) = state.vnode.take().and_then(|vnode| vnode.elm()) {
            host.remove_node(state.parent, root)?;
        }
        debug!(watcher = %self.watcher.id(), "component unmounted");
        Ok(())
    }
}
