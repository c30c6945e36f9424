use std::time::Instant;

use anchortip::{Chrome, MeasuredContainer, Tooltip, TooltipConfig};
use iced::{
    Alignment, Element, Event, Length, Rectangle, Size, Subscription, Task,
    Theme,
    padding::top,
    widget::{Canvas, Column, Container, Row, Stack, container, mouse_area, text},
    window,
};
use tracing::{debug, error, info, warn};

use crate::{
    file_watcher::{CheckResult, CheckType, ConfigPath, watch_config},
    other::{
        config::{Anchor, ColorVars, Config, RawConfig},
        constants::{APP_NAMESPACE, FRAME_INTERVAL},
    },
};

const GRID_COLUMNS: usize = 3;

#[derive(Debug, Clone)]
pub enum Message {
    IcedEvent(Event),
    FileWatcherEvent(CheckResult),

    ShowTooltip(usize),
    HideTooltip(usize),
    AnchorMeasured(usize, Option<Rectangle>),
    ContentMeasured(usize, Size),
    AnimationTick(Instant),
}

struct Slot {
    id: container::Id,
    anchor: Anchor,
    tooltip: Tooltip,
}

impl Slot {
    fn new(anchor: Anchor) -> Self {
        Self {
            id: container::Id::unique(),
            tooltip: Tooltip::new(anchor.tooltip.clone()),
            anchor,
        }
    }
}

pub struct Demo {
    config: Config,
    color_vars: ColorVars,
    path: ConfigPath,
    viewport: Size,
    slots: Vec<Slot>,
}

fn measure_anchor(index: usize, id: container::Id) -> Task<Message> {
    container::visible_bounds(id)
        .map(move |bounds| Message::AnchorMeasured(index, bounds))
}

#[profiling::all_functions]
impl Demo {
    pub fn new(
        config: Config,
        color_vars: ColorVars,
        path: ConfigPath,
    ) -> (Self, Task<Message>) {
        let slots = config.anchors.iter().cloned().map(Slot::new).collect();
        let demo = Self {
            viewport: config.window.size,
            config,
            color_vars,
            path,
            slots,
        };
        (demo, Task::none())
    }

    pub fn title(&self) -> String {
        String::from(APP_NAMESPACE)
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions: Vec<Subscription<Message>> =
            Vec::with_capacity(3);

        subscriptions.push(iced::event::listen().map(Message::IcedEvent));
        subscriptions.push(watch_config(self.path.clone()));

        let now = Instant::now();
        if self.slots.iter().any(|slot| slot.tooltip.is_animating(now)) {
            subscriptions.push(
                iced::time::every(FRAME_INTERVAL).map(Message::AnimationTick),
            );
        }

        Subscription::batch(subscriptions)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let now = Instant::now();
        match message {
            Message::IcedEvent(Event::Window(window::Event::Resized(size))) => {
                debug!("viewport resized to {size:?}");
                self.viewport = size;
                return Task::batch(
                    self.slots
                        .iter()
                        .enumerate()
                        .filter(|(_, slot)| slot.tooltip.is_rendered())
                        .map(|(i, slot)| measure_anchor(i, slot.id.clone())),
                );
            }
            Message::IcedEvent(_) => {}
            Message::ShowTooltip(index) => {
                if let Some(slot) = self.slots.get_mut(index)
                    && slot.tooltip.show(now)
                {
                    return measure_anchor(index, slot.id.clone());
                }
            }
            Message::HideTooltip(index) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    slot.tooltip.hide(now);
                }
            }
            Message::AnchorMeasured(index, bounds) => {
                if let Some(slot) = self.slots.get_mut(index)
                    && slot.tooltip.anchor_measured(bounds, now)
                {
                    return measure_anchor(index, slot.id.clone());
                }
            }
            Message::ContentMeasured(index, size) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    slot.tooltip.content_measured(size, now);
                }
            }
            Message::AnimationTick(now) => {
                for slot in &mut self.slots {
                    slot.tooltip.tick(now);
                }
            }
            Message::FileWatcherEvent(event) => {
                match event.colors {
                    CheckType::Changed => {
                        match ColorVars::load(&self.path.colors) {
                            Ok(new_color_vars) => {
                                self.color_vars = new_color_vars;
                                return self.reload_config();
                            }
                            Err(e) => {
                                error!("failed to parse colors file");
                                error!("{e:?}");
                            }
                        }
                    }
                    CheckType::Disappeared => {
                        warn!(
                            "colors file not found at {}",
                            self.path.colors.display()
                        );
                    }
                    CheckType::Missing | CheckType::Unchanged => {}
                }
                match event.config {
                    CheckType::Changed => {
                        return self.reload_config();
                    }
                    CheckType::Disappeared => {
                        warn!(
                            "config file not found at {}",
                            self.path.config.display()
                        );
                    }
                    CheckType::Missing | CheckType::Unchanged => {}
                }
            }
        }

        Task::none()
    }

    fn reload_config(&mut self) -> Task<Message> {
        match RawConfig::load(&self.path.config) {
            Ok(raw) => {
                let config = raw.hydrate(&self.color_vars);
                self.apply(config);
                info!("reloaded config");
            }
            Err(e) => {
                error!("failed to reload config, keeping the previous one");
                error!("{e:?}");
            }
        }
        Task::none()
    }

    /// Keeps live tooltips when the anchor list keeps its shape, otherwise
    /// rebuilds the grid.
    fn apply(&mut self, config: Config) {
        let now = Instant::now();
        if self.slots.len() == config.anchors.len() {
            for (slot, anchor) in self.slots.iter_mut().zip(&config.anchors) {
                slot.tooltip.reconfigure(anchor.tooltip.clone(), now);
                slot.anchor = anchor.clone();
            }
        } else {
            for slot in &mut self.slots {
                slot.tooltip.detach();
            }
            self.slots =
                config.anchors.iter().cloned().map(Slot::new).collect();
        }
        self.config = config;
    }

    fn view_anchor<'a>(
        &'a self,
        index: usize,
        slot: &'a Slot,
    ) -> Element<'a, Message> {
        mouse_area(
            container(text(&slot.anchor.label))
                .id(slot.id.clone())
                .padding([8, 14])
                .style(container::bordered_box),
        )
        .on_enter(Message::ShowTooltip(index))
        .on_exit(Message::HideTooltip(index))
        .into()
    }

    /// Anchors in rows, pushed toward the window edges so the outer ones
    /// exercise the overflow correction.
    fn view_grid(&self) -> Element<'_, Message> {
        let rows = self.slots.len().div_ceil(GRID_COLUMNS);
        let place = |i: usize, count: usize| match i {
            0 => Alignment::Start,
            i if i + 1 == count && count > 1 => Alignment::End,
            _ => Alignment::Center,
        };

        Column::with_children(
            self.slots.chunks(GRID_COLUMNS).enumerate().map(
                |(row, chunk)| {
                    Row::with_children(chunk.iter().enumerate().map(
                        |(column, slot)| {
                            let index = row * GRID_COLUMNS + column;
                            Container::new(self.view_anchor(index, slot))
                                .width(Length::Fill)
                                .height(Length::Fill)
                                .align_x(place(column, GRID_COLUMNS))
                                .align_y(place(row, rows))
                                .into()
                        },
                    ))
                    .height(Length::Fill)
                    .into()
                },
            ),
        )
        .padding(4)
        .into()
    }

    fn view_tooltip<'a>(
        &'a self,
        index: usize,
        slot: &'a Slot,
        now: Instant,
    ) -> Vec<Element<'a, Message>> {
        let tooltip = &slot.tooltip;
        let config: &TooltipConfig = tooltip.config();
        let opacity = tooltip.opacity(now);

        let content = MeasuredContainer::new(
            text(&slot.anchor.text),
            move |size| Message::ContentMeasured(index, size),
        )
        .padding(config.padding)
        .width(config.width.map_or(Length::Shrink, Length::Fixed))
        .height(config.height.map_or(Length::Shrink, Length::Fixed))
        .known(tooltip.content())
        .text_color(config.text_color)
        .opacity(opacity);

        let placed = tooltip
            .layout(self.viewport, self.config.window.safe_area, now)
            .filter(|_| tooltip.shows_chrome());

        let Some((measured, layout)) = placed else {
            // Invisible pass at the origin until both sizes are known.
            return vec![content.into()];
        };

        let layout = layout.pinned_to_origin(&measured);
        let chrome = Chrome::new(config, &measured, &layout, opacity);
        let body = layout.body_bounds(&measured);

        vec![
            Canvas::new(chrome)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            Container::new(content)
                .padding(top(body.y).left(body.x))
                .into(),
        ]
    }

    pub fn view(&self) -> Element<'_, Message> {
        let now = Instant::now();

        let mut layered: Vec<(usize, &Slot)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.tooltip.is_rendered())
            .collect();
        layered.sort_by(|(_, a), (_, b)| {
            a.tooltip
                .config()
                .z_index
                .total_cmp(&b.tooltip.config().z_index)
        });

        layered
            .into_iter()
            .flat_map(|(index, slot)| self.view_tooltip(index, slot, now))
            .fold(Stack::new().push(self.view_grid()), Stack::push)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}
