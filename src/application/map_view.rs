//! Reactive logic of the results map.
//!
//! Fits a camera around every placeable business once the container has a
//! size, places one marker per business, dims the other markers while the map
//! itself holds focus, and shows a popup for the selected business.

use super::store::{FocusSource, FocusState, InteractionState, InteractionStore, SubscriptionId};
use crate::domain::{fit_bounds, Business, BusinessId, Camera, ContainerSize, FitOptions, LatLng, ScreenRect};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerVariant {
    Normal,
    /// Desaturated: the map is focused on another marker.
    Deemphasized,
}

/// Visual variant of the marker for `id`.
///
/// List-sourced focus never dims markers.
pub fn marker_variant(state: &InteractionState, id: &BusinessId) -> MarkerVariant {
    match &state.focus {
        FocusState::FocusedByMap(focused) if focused != id => MarkerVariant::Deemphasized,
        _ => MarkerVariant::Normal,
    }
}

/// Marker footprint in cells and the cell that sits on the geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerGeometry {
    pub width: u16,
    pub height: u16,
    pub anchor_x: u16,
    pub anchor_y: u16,
}

impl Default for MarkerGeometry {
    fn default() -> Self {
        Self { width: 3, height: 1, anchor_x: 1, anchor_y: 0 }
    }
}

/// Pixel size of one terminal cell, used to turn cell layouts into the pixel
/// container the camera is fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CellSize {
    fn default() -> Self {
        Self { width: 8.0, height: 16.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlacement {
    pub id: BusinessId,
    /// Position of the business in the input list.
    pub index: usize,
    pub location: LatLng,
    /// Marker cells, in screen coordinates.
    pub rect: ScreenRect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: BusinessId,
    pub index: usize,
    pub location: LatLng,
    /// Screen cell of the geographic point.
    pub anchor: (f64, f64),
}

#[derive(Debug)]
pub struct MapView {
    store: InteractionStore,
    businesses: Rc<[Business]>,
    options: FitOptions,
    cell: CellSize,
    marker: MarkerGeometry,
    area: ScreenRect,
    camera: Option<Camera>,
    placements: Vec<MarkerPlacement>,
    hovered: Option<BusinessId>,
    state: Rc<RefCell<InteractionState>>,
    subscription: SubscriptionId,
}

impl MapView {
    pub fn new(
        store: InteractionStore,
        businesses: Rc<[Business]>,
        options: FitOptions,
        cell: CellSize,
        marker: MarkerGeometry,
    ) -> Self {
        let state = Rc::new(RefCell::new(store.snapshot()));
        let sink = Rc::clone(&state);
        let subscription = store.subscribe(move |snapshot| *sink.borrow_mut() = snapshot.clone());

        Self {
            store,
            businesses,
            options,
            cell,
            marker,
            area: ScreenRect::default(),
            camera: None,
            placements: Vec::new(),
            hovered: None,
            state,
            subscription,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state.borrow().clone()
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn area(&self) -> ScreenRect {
        self.area
    }

    pub fn placements(&self) -> &[MarkerPlacement] {
        &self.placements
    }

    pub fn hovered(&self) -> Option<&BusinessId> {
        self.hovered.as_ref()
    }

    /// Layout measurement callback. Refits only when the size changed.
    pub fn set_container(&mut self, area: ScreenRect) {
        if area == self.area {
            return;
        }
        self.area = area;
        self.refit();
    }

    fn container_size(&self) -> ContainerSize {
        ContainerSize::new(self.area.width.max(0.0) * self.cell.width, self.area.height.max(0.0) * self.cell.height)
    }

    fn refit(&mut self) {
        // Businesses without coordinates cannot be placed; they take no part
        // in fitting or markers.
        let placeable = self
            .businesses
            .iter()
            .enumerate()
            .filter_map(|(index, business)| business.location().map(|location| (index, location)))
            .collect::<Vec<_>>();
        let points = placeable.iter().map(|(_, location)| *location).collect::<Vec<_>>();

        self.camera = fit_bounds(&points, self.container_size(), &self.options);
        let Some(camera) = self.camera else {
            self.placements.clear();
            return;
        };
        debug!(
            lat = camera.center.lat,
            lng = camera.center.lng,
            zoom = camera.zoom,
            markers = placeable.len(),
            "map camera fitted"
        );

        self.placements = placeable
            .into_iter()
            .map(|(index, location)| MarkerPlacement {
                id: self.businesses[index].id.clone(),
                index,
                location,
                rect: self.marker_rect(&camera, location),
            })
            .collect();
    }

    fn anchor_cell(&self, camera: &Camera, location: LatLng) -> (f64, f64) {
        let (px, py) = camera.project(location);
        (
            self.area.left + (px / self.cell.width).floor(),
            self.area.top + (py / self.cell.height).floor(),
        )
    }

    fn marker_rect(&self, camera: &Camera, location: LatLng) -> ScreenRect {
        let (x, y) = self.anchor_cell(camera, location);
        ScreenRect::new(
            x - f64::from(self.marker.anchor_x),
            y - f64::from(self.marker.anchor_y),
            f64::from(self.marker.width),
            f64::from(self.marker.height),
        )
    }

    /// Markers to draw, in drawing order, with their variants.
    pub fn markers(&self) -> Vec<(&MarkerPlacement, MarkerVariant)> {
        let state = self.state.borrow();
        self.placements
            .iter()
            .map(|placement| (placement, marker_variant(&state, &placement.id)))
            .collect()
    }

    /// The single detail popup, if a placed business is selected.
    pub fn popup(&self) -> Option<Popup> {
        let camera = self.camera.as_ref()?;
        let state = self.state.borrow();
        let selected = state.selected_business_id()?;
        let placement = self.placements.iter().find(|p| &p.id == selected)?;
        Some(Popup {
            id: placement.id.clone(),
            index: placement.index,
            location: placement.location,
            anchor: self.anchor_cell(camera, placement.location),
        })
    }

    /// Topmost marker under the cell `(x, y)`.
    pub fn marker_at(&self, x: f64, y: f64) -> Option<&MarkerPlacement> {
        if !self.area.contains(x, y) {
            return None;
        }
        self.placements.iter().rev().find(|p| p.rect.contains(x, y))
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        match self.marker_at(x, y).map(|p| p.id.clone()) {
            Some(id) => self.enter_marker(id),
            None => self.pointer_left(),
        }
    }

    fn enter_marker(&mut self, id: BusinessId) {
        if self.hovered.as_ref() == Some(&id) {
            return;
        }
        if self.hovered.is_some() {
            self.store.focus_on_business_id(None, FocusSource::Map);
        }
        self.hovered = Some(id.clone());
        self.store.focus_on_business_id(Some(id), FocusSource::Map);
    }

    pub fn pointer_left(&mut self) {
        if self.hovered.take().is_some() {
            self.store.focus_on_business_id(None, FocusSource::Map);
        }
    }

    pub fn click(&mut self, x: f64, y: f64) {
        if let Some(id) = self.marker_at(x, y).map(|p| p.id.clone()) {
            self.toggle_selection(id);
        }
    }

    /// Deselects `id` if it is the current selection, otherwise selects it.
    pub fn toggle_selection(&mut self, id: BusinessId) {
        let already_selected = self.state.borrow().selected_business_id() == Some(&id);
        let next = if already_selected { None } else { Some(id) };
        self.store.set_selected_business_id(next);
    }

    /// Keyboard stand-in for hovering: focuses the next or previous marker.
    pub fn cycle_focus(&mut self, delta: isize) {
        if self.placements.is_empty() {
            return;
        }
        let len = self.placements.len() as isize;
        let current = self
            .hovered
            .as_ref()
            .and_then(|id| self.placements.iter().position(|p| &p.id == id));
        let next = match current {
            Some(position) => (position as isize + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        } as usize;
        let id = self.placements[next].id.clone();
        self.enter_marker(id);
    }

    /// Keyboard stand-in for clicking the hovered marker.
    pub fn toggle_hovered(&mut self) {
        if let Some(id) = self.hovered.clone() {
            self.toggle_selection(id);
        }
    }
}

impl Drop for MapView {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
