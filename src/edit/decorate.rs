use crate::{
    edit::request::ClipRef,
    edit::transaction::Transaction,
    foundation::core::FrameRange,
    foundation::error::{EditError, EditResult},
    model::clip::Filter,
    model::compositor::{CompositorId, CompositorSpec},
};

pub(crate) fn add_filter(
    tx: &mut Transaction<'_>,
    r: ClipRef,
    filter: &Filter,
    index: Option<usize>,
) -> EditResult<()> {
    if filter.service.trim().is_empty() {
        return Err(EditError::validation("filter service must be non-empty"));
    }
    let mut clip = tx.track(r.track)?.clip(r.index)?.clone();
    if clip.is_blank() {
        return Err(EditError::validation("blanks cannot carry filters"));
    }
    let at = index.unwrap_or(clip.filters.len());
    if at > clip.filters.len() {
        return Err(EditError::invalid_range(format!(
            "filter index {at} is past the end of clip {} ({} filters)",
            clip.id,
            clip.filters.len()
        )));
    }
    clip.filters.insert(at, filter.clone());
    tx.replace(r.track, r.index, clip)
}

pub(crate) fn remove_filter(tx: &mut Transaction<'_>, r: ClipRef, index: usize) -> EditResult<()> {
    let mut clip = tx.track(r.track)?.clip(r.index)?.clone();
    if index >= clip.filters.len() {
        return Err(EditError::not_found(format!(
            "clip {} has no filter at index {index}",
            clip.id
        )));
    }
    clip.filters.remove(index);
    tx.replace(r.track, r.index, clip)
}

fn position_of(tx: &Transaction<'_>, id: CompositorId) -> EditResult<usize> {
    tx.seq()
        .compositors
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| EditError::not_found(format!("compositor {}", id.0)))
}

pub(crate) fn add_compositor(tx: &mut Transaction<'_>, spec: &CompositorSpec) -> EditResult<()> {
    tx.seq().editable_track(spec.a_track)?;
    if let Some(origin) = spec.origin_clip {
        tx.seq().clip(origin)?;
    }
    let id = tx.alloc_compositor_id();
    let comp = spec.clone().into_compositor(id);
    comp.validate(tx.seq().tracks.len())?;
    tx.insert_compositor(comp);
    Ok(())
}

pub(crate) fn remove_compositor(tx: &mut Transaction<'_>, id: CompositorId) -> EditResult<()> {
    let position = position_of(tx, id)?;
    tx.seq().editable_track(tx.seq().compositors[position].a_track)?;
    tx.remove_compositor(position)
}

pub(crate) fn move_compositor(
    tx: &mut Transaction<'_>,
    id: CompositorId,
    range: FrameRange,
) -> EditResult<()> {
    if range.is_empty() {
        return Err(EditError::invalid_range("compositor range must be non-empty"));
    }
    let position = position_of(tx, id)?;
    let mut comp = tx.seq().compositors[position].clone();
    tx.seq().editable_track(comp.a_track)?;
    // A hand-placed compositor stops following its clip.
    comp.origin_clip = None;
    comp.range = range;
    tx.replace_compositor(position, comp)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/decorate.rs"]
mod tests;
