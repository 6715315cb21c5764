/// Заголовок среза LSE (Part0), фиксированный размер 20 байт.
///
/// Один срез = одно измерение канала для пары (кадр, слот) и антенного порта.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceHeader {
    /// Номер системного кадра (0–1023, циклический)
    pub frame_number: u32,
    /// Номер слота внутри кадра
    pub slot: u16,
    /// Передающий порт
    pub tx_port: u16,
    /// Индекс приёмного порта
    pub rx_port_index: u16,
    /// Число приёмных антенн
    pub num_rx: u16,
    /// Число передающих антенн
    pub num_tx: u16,
    /// Смещение первой поднесущей (k0)
    pub subcarrier_offset: u16,
    /// Шаг по поднесущим
    pub subcarrier_step: u16,
    /// Длина оценки канала в поднесущих
    pub length: u16,
}

impl SliceHeader {
    /// Пара (кадр, слот), по которой восстанавливается абсолютный слот.
    pub fn sequence_pair(&self) -> (u32, u16) {
        (self.frame_number, self.slot)
    }
}
