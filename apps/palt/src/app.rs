use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use palt_core::{
    CommandOutcome, CommandService, DeviceRecord, ModuleKind, ModuleRecord, Settings, Snapshot,
    StateColor, SystemRunner,
};
use palt_ui::{colors, styles};
use tracing::{debug, info, warn};

use crate::backend::{self, Request};

/// Shown in an entry field after its command failed.
const ERROR_MARK: &str = "ERR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Loopback,
    VirtualSinks,
    RemapSources,
    Remove,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Loopback, Tab::VirtualSinks, Tab::RemapSources, Tab::Remove];

    fn label(&self) -> &'static str {
        match self {
            Tab::Loopback => "Loopback",
            Tab::VirtualSinks => "Virtual Sinks",
            Tab::RemapSources => "Remap Sources",
            Tab::Remove => "Remove",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    RefreshAll,
    Refreshed(u64, Result<Snapshot, String>),
    TabSelected(Tab),
    OpenVolumeControl,
    VolumeControlOpened(bool),

    LoopbackSourceChanged(String),
    LoopbackSinkChanged(String),
    SinkNameChanged(String),
    RemapNameChanged(String),
    RemapSourceChanged(String),
    DeleteIdChanged(String),

    LoopbackSourcePicked(u32),
    LoopbackSinkPicked(u32),
    RemapSourcePicked(u32),
    DeleteIdPicked(u32),

    CreateLoopback,
    CreateVirtualSink,
    CreateRemappedSource,
    DeleteModule,
    CommandFinished(Request, CommandOutcome),
}

pub struct PaltApp {
    commands: CommandService<SystemRunner>,
    tab: Tab,
    snapshot: Snapshot,
    // Set when the last refresh could not reach the server
    status: Option<String>,
    // Bumped per RefreshAll; only the newest refresh may land
    refresh_generation: u64,

    loopback_source: String,
    loopback_sink: String,
    sink_name: String,
    remap_name: String,
    remap_source: String,
    delete_id: String,
}

/// One clickable row in a record list.
struct Entry<'a> {
    id: u32,
    label: &'a str,
    color: StateColor,
}

impl<'a> From<&'a DeviceRecord> for Entry<'a> {
    fn from(record: &'a DeviceRecord) -> Self {
        Self {
            id: record.id,
            label: &record.nice_name,
            color: record.color,
        }
    }
}

impl<'a> From<&'a ModuleRecord> for Entry<'a> {
    fn from(record: &'a ModuleRecord) -> Self {
        Self {
            id: record.id,
            label: &record.nice_name,
            color: record.color,
        }
    }
}

impl PaltApp {
    pub fn new(settings: Settings) -> (Self, Task<Message>) {
        (
            Self {
                commands: CommandService::system(settings),
                tab: Tab::Loopback,
                snapshot: Snapshot::default(),
                status: None,
                refresh_generation: 0,
                loopback_source: String::new(),
                loopback_sink: String::new(),
                sink_name: String::new(),
                remap_name: String::new(),
                remap_source: String::new(),
                delete_id: String::new(),
            },
            Task::done(Message::RefreshAll),
        )
    }

    pub fn title(&self) -> String {
        "PulseAudio Loopback Tool".to_string()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn run(&self, request: Request) -> Task<Message> {
        let commands = self.commands.clone();
        Task::perform(
            backend::execute(commands, request.clone()),
            move |outcome| Message::CommandFinished(request.clone(), outcome),
        )
    }

    /// Replace the entry fields involved in a failed request with the error mark.
    fn mark_failed(&mut self, request: &Request) {
        let fields: Vec<&mut String> = match request {
            Request::Loopback { .. } => vec![&mut self.loopback_source, &mut self.loopback_sink],
            Request::VirtualSink { .. } => vec![&mut self.sink_name],
            Request::RemapSource { .. } => vec![&mut self.remap_name, &mut self.remap_source],
            Request::DeleteModule { .. } => vec![&mut self.delete_id],
        };
        for field in fields {
            *field = ERROR_MARK.to_string();
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::RefreshAll => {
                self.refresh_generation += 1;
                let generation = self.refresh_generation;
                info!("Global refresh triggered (#{})", generation);
                Task::perform(backend::refresh(), move |result| {
                    Message::Refreshed(generation, result)
                })
            }
            Message::Refreshed(generation, _) if generation != self.refresh_generation => {
                debug!(
                    "Dropping stale refresh #{} (latest is #{})",
                    generation, self.refresh_generation
                );
                Task::none()
            }
            Message::Refreshed(_, Ok(snapshot)) => {
                debug!(
                    "Refreshed: {} sources, {} sinks, {} modules",
                    snapshot.sources.len(),
                    snapshot.sinks.len(),
                    snapshot.modules.len()
                );
                self.snapshot = snapshot;
                self.status = None;
                Task::none()
            }
            Message::Refreshed(_, Err(e)) => {
                warn!("Refresh failed: {}", e);
                self.status = Some(e);
                Task::none()
            }
            Message::TabSelected(tab) => {
                self.tab = tab;
                Task::none()
            }
            Message::OpenVolumeControl => {
                Task::perform(
                    backend::open_volume_control(self.commands.clone()),
                    Message::VolumeControlOpened,
                )
            }
            Message::VolumeControlOpened(opened) => {
                if !opened {
                    self.status = Some("Could not open the volume control".to_string());
                }
                Task::none()
            }

            Message::LoopbackSourceChanged(value) => {
                self.loopback_source = value;
                Task::none()
            }
            Message::LoopbackSinkChanged(value) => {
                self.loopback_sink = value;
                Task::none()
            }
            Message::SinkNameChanged(value) => {
                self.sink_name = value;
                Task::none()
            }
            Message::RemapNameChanged(value) => {
                self.remap_name = value;
                Task::none()
            }
            Message::RemapSourceChanged(value) => {
                self.remap_source = value;
                Task::none()
            }
            Message::DeleteIdChanged(value) => {
                self.delete_id = value;
                Task::none()
            }

            Message::LoopbackSourcePicked(id) => {
                self.loopback_source = id.to_string();
                Task::none()
            }
            Message::LoopbackSinkPicked(id) => {
                self.loopback_sink = id.to_string();
                Task::none()
            }
            Message::RemapSourcePicked(id) => {
                self.remap_source = id.to_string();
                Task::none()
            }
            Message::DeleteIdPicked(id) => {
                self.delete_id = id.to_string();
                Task::none()
            }

            Message::CreateLoopback => self.run(Request::Loopback {
                source: self.loopback_source.clone(),
                sink: self.loopback_sink.clone(),
            }),
            Message::CreateVirtualSink => self.run(Request::VirtualSink {
                name: self.sink_name.clone(),
            }),
            Message::CreateRemappedSource => self.run(Request::RemapSource {
                name: self.remap_name.clone(),
                source: self.remap_source.clone(),
            }),
            Message::DeleteModule => self.run(Request::DeleteModule {
                id: self.delete_id.clone(),
            }),
            Message::CommandFinished(request, outcome) => {
                if outcome.is_success() {
                    Task::done(Message::RefreshAll)
                } else {
                    self.mark_failed(&request);
                    Task::none()
                }
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            button(text("Refresh All"))
                .on_press(Message::RefreshAll)
                .style(styles::action),
            button(text("Volume Control"))
                .on_press(Message::OpenVolumeControl)
                .style(styles::action),
        ]
        .spacing(10);

        let tabs = row(Tab::ALL.iter().map(|tab| {
            button(text(tab.label()).size(14))
                .on_press(Message::TabSelected(*tab))
                .padding([6, 12])
                .style(styles::tab(self.tab == *tab))
                .into()
        }))
        .spacing(2);

        let body = match self.tab {
            Tab::Loopback => self.view_loopback(),
            Tab::VirtualSinks => self.view_virtual_sinks(),
            Tab::RemapSources => self.view_remap_sources(),
            Tab::Remove => self.view_remove(),
        };

        let mut content = column![header, tabs, body].spacing(10).padding(10);
        if let Some(status) = &self.status {
            content = content.push(text(status.as_str()).size(13).color(colors::TEXT_ERROR));
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(styles::window)
            .into()
    }

    fn view_loopback(&self) -> Element<'_, Message> {
        let sources = record_list(
            "Source List",
            self.snapshot.sources.iter().map(Entry::from),
            Some(Message::LoopbackSourcePicked),
        );
        let sinks = record_list(
            "Sink List",
            self.snapshot.sinks.iter().map(Entry::from),
            Some(Message::LoopbackSinkPicked),
        );

        let controls = row![
            column![
                text("Source"),
                id_input(&self.loopback_source, Message::LoopbackSourceChanged),
            ]
            .spacing(5)
            .align_x(Alignment::Center),
            column![
                text("will pipe sound to"),
                button(text("Create Loopback"))
                    .on_press(Message::CreateLoopback)
                    .style(styles::action),
            ]
            .spacing(5)
            .align_x(Alignment::Center),
            column![
                text("Sink"),
                id_input(&self.loopback_sink, Message::LoopbackSinkChanged),
            ]
            .spacing(5)
            .align_x(Alignment::Center),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        row![sources, controls, sinks]
            .spacing(10)
            .height(Length::Fill)
            .align_y(Alignment::Center)
            .into()
    }

    fn view_virtual_sinks(&self) -> Element<'_, Message> {
        let null_sinks = self.snapshot.modules_of(ModuleKind::NullSink);
        let list = record_list("Virtual Sinks", null_sinks.map(Entry::from), None);

        let controls = row![
            text("Sink Name: "),
            text_input("name", &self.sink_name)
                .on_input(Message::SinkNameChanged)
                .width(Length::Fixed(180.0)),
            button(text("Create"))
                .on_press(Message::CreateVirtualSink)
                .style(styles::action),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        column![list, controls]
            .spacing(10)
            .align_x(Alignment::Center)
            .into()
    }

    fn view_remap_sources(&self) -> Element<'_, Message> {
        let list = record_list(
            "Sources",
            self.snapshot.sources.iter().map(Entry::from),
            Some(Message::RemapSourcePicked),
        );

        let name_row = row![
            text("Source Name: "),
            text_input("name", &self.remap_name)
                .on_input(Message::RemapNameChanged)
                .width(Length::Fixed(180.0)),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let id_row = row![
            text("Source ID: "),
            id_input(&self.remap_source, Message::RemapSourceChanged),
            button(text("Create"))
                .on_press(Message::CreateRemappedSource)
                .style(styles::action),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        column![list, name_row, id_row]
            .spacing(10)
            .align_x(Alignment::Center)
            .into()
    }

    fn view_remove(&self) -> Element<'_, Message> {
        let list = record_list(
            "Relevant Modules",
            self.snapshot.modules.iter().map(Entry::from),
            Some(Message::DeleteIdPicked),
        );

        let controls = row![
            id_input(&self.delete_id, Message::DeleteIdChanged),
            button(text("Delete"))
                .on_press(Message::DeleteModule)
                .style(styles::action),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        column![list, controls]
            .spacing(10)
            .align_x(Alignment::Center)
            .into()
    }
}

fn id_input<'a>(value: &str, on_input: fn(String) -> Message) -> Element<'a, Message> {
    text_input("id", value)
        .on_input(on_input)
        .width(Length::Fixed(70.0))
        .into()
}

fn record_list<'a>(
    title: &'a str,
    entries: impl Iterator<Item = Entry<'a>>,
    on_pick: Option<fn(u32) -> Message>,
) -> Element<'a, Message> {
    let rows: Vec<Element<'a, Message>> = entries
        .map(|entry| {
            button(text(entry.label).size(13))
                .on_press_maybe(on_pick.map(|pick| pick(entry.id)))
                .width(Length::Fill)
                .padding([3, 6])
                .style(styles::list_row(entry.color))
                .into()
        })
        .collect();

    container(
        column![
            text(title).size(13),
            scrollable(Column::with_children(rows).spacing(1)).height(Length::Fill),
        ]
        .spacing(4),
    )
    .padding(6)
    .width(Length::Fill)
    .height(Length::Fill)
    .style(styles::list_frame)
    .into()
}
