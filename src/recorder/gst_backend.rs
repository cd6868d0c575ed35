use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;

use super::error::RecorderError;
use super::pipeline::{
    ActivePipeline, BusSender, PipelineBackend, PipelineEvent, PropertyValue, StagePlan,
};
use super::settings::RecordingSettings;

/// Element factories the recorder needs, with the package that ships each.
pub const REQUIRED_ELEMENTS: [(&str, &str); 5] = [
    ("ximagesrc", "gstreamer1.0-plugins-good"),
    ("videoconvert", "gstreamer1.0-plugins-base"),
    ("x264enc", "gstreamer1.0-plugins-ugly"),
    ("mp4mux", "gstreamer1.0-plugins-good"),
    ("filesink", "gstreamer1.0 core"),
];

/// Required factories that are not installed. Call after `gst::init`.
pub fn missing_elements() -> Vec<(&'static str, &'static str)> {
    REQUIRED_ELEMENTS
        .iter()
        .copied()
        .filter(|(element, _)| gst::ElementFactory::find(element).is_none())
        .collect()
}

fn plugin_for(element: &str) -> &'static str {
    REQUIRED_ELEMENTS
        .iter()
        .find(|(name, _)| *name == element)
        .map(|(_, plugin)| *plugin)
        .unwrap_or("the matching GStreamer plugin")
}

/// Builds `ximagesrc ! videoconvert ! x264enc ! mp4mux ! filesink` pipelines.
#[derive(Debug, Default)]
pub struct GstBackend;

impl PipelineBackend for GstBackend {
    type Pipeline = GstPipeline;

    fn assemble(
        &self,
        settings: &RecordingSettings,
        bus: BusSender,
    ) -> Result<GstPipeline, RecorderError> {
        let pipeline = gst::Pipeline::with_name("screen-recorder-pipeline");

        let plans = StagePlan::for_settings(settings);
        let mut elements = Vec::with_capacity(plans.len());
        for plan in &plans {
            elements.push(make_element(plan)?);
        }

        // From here on a failure drops `pipeline`, which unrefs every added element.
        pipeline
            .add_many(&elements)
            .map_err(|e| RecorderError::Link(e.to_string()))?;
        gst::Element::link_many(&elements).map_err(|e| RecorderError::Link(e.to_string()))?;

        let gst_bus = pipeline
            .bus()
            .ok_or_else(|| RecorderError::Bus("pipeline has no bus".into()))?;
        let pipeline_weak = pipeline.downgrade();
        let session = bus.session();
        let watch = gst_bus
            .add_watch_local(move |_, msg| {
                if let Some(event) = translate(msg, &pipeline_weak) {
                    bus.post(event);
                }
                glib::ControlFlow::Continue
            })
            .map_err(|e| RecorderError::Bus(e.to_string()))?;

        log::debug!(
            "Assembled pipeline for session {session}: {}",
            plans.iter().map(|p| p.factory).collect::<Vec<_>>().join(" ! ")
        );

        Ok(GstPipeline {
            pipeline,
            _watch: watch,
        })
    }
}

fn make_element(plan: &StagePlan) -> Result<gst::Element, RecorderError> {
    if gst::ElementFactory::find(plan.factory).is_none() {
        return Err(RecorderError::MissingElement {
            element: plan.factory,
            plugin: plugin_for(plan.factory),
        });
    }

    log::trace!("Creating {:?} stage from {}", plan.stage, plan.factory);
    let mut builder = gst::ElementFactory::make(plan.factory).name(plan.name);
    for (key, value) in &plan.properties {
        let key: &str = key;
        builder = match value {
            PropertyValue::Bool(v) => builder.property(key, *v),
            PropertyValue::UInt(v) => builder.property(key, *v),
            PropertyValue::Nick(nick) => builder.property_from_str(key, nick),
            PropertyValue::Str(s) => builder.property(key, s.as_str()),
        };
    }

    builder.build().map_err(|e| RecorderError::ElementCreation {
        element: plan.factory,
        reason: e.to_string(),
    })
}

fn translate(msg: &gst::Message, pipeline: &glib::WeakRef<gst::Pipeline>) -> Option<PipelineEvent> {
    use gst::MessageView;

    match msg.view() {
        MessageView::Eos(..) => Some(PipelineEvent::EndOfStream),
        MessageView::Error(err) => {
            log::error!(
                "Error from {:?}: {} ({:?})",
                err.src().map(|s| s.path_string()),
                err.error(),
                err.debug()
            );
            Some(PipelineEvent::Error(err.error().to_string()))
        }
        MessageView::StateChanged(changed) => {
            let pipeline = pipeline.upgrade()?;
            if changed.src() != Some(pipeline.upcast_ref::<gst::Object>()) {
                return None;
            }
            Some(PipelineEvent::StateChanged {
                old: format!("{:?}", changed.old()),
                current: format!("{:?}", changed.current()),
            })
        }
        _ => None,
    }
}

/// A live GStreamer pipeline plus its bus watch.
pub struct GstPipeline {
    pipeline: gst::Pipeline,
    _watch: gst::bus::BusWatchGuard,
}

impl ActivePipeline for GstPipeline {
    fn play(&mut self) -> Result<(), RecorderError> {
        self.pipeline
            .set_state(gst::State::Playing)
            .map(|_| ())
            .map_err(|e| RecorderError::Start(e.to_string()))
    }

    fn request_eos(&mut self) -> Result<(), RecorderError> {
        if self.pipeline.send_event(gst::event::Eos::new()) {
            Ok(())
        } else {
            Err(RecorderError::EndOfStream(
                "pipeline did not accept the event".into(),
            ))
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            log::warn!("Failed to set pipeline to NULL: {e}");
        }
    }
}

impl Drop for GstPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
